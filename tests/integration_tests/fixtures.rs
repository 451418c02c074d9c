//! Test fixtures for integration tests
//!
//! Content API payloads and helpers that wire a router to a mock backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use kosen_web::cache::QueryCache;
use kosen_web::client::ApiClient;
use kosen_web::config::Config;
use kosen_web::site::{create_router, AppState};
use kosen_web::utils::retry::RetryConfig;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Media origin used by every fixture config
pub const MEDIA_URL: &str = "http://media.test";

pub const NAVIGATION_JSON: &str = r#"{
    "count": 2,
    "next": null,
    "previous": null,
    "results": [
        {
            "id": "a1b2",
            "title": "Бидний тухай",
            "slug": "about",
            "children": [
                {"id": "c3d4", "title": "Түүх", "slug": "history", "children": []}
            ]
        },
        {"id": "e5f6", "title": "Элсэлт", "slug": "admission", "children": null}
    ]
}"#;

pub const CONTENT_JSON: &str = r#"{
    "id": 5,
    "title": "Элсэлт 2025",
    "description": "<p>Элсэлтийн журам</p>",
    "slug": "elselt-2025",
    "tags": [{"id": 1, "name": "Мэдээ", "slug": "news"}],
    "texts": [
        {"id": 1, "order": 1, "text": "<p>Эхний хэсэг<script>alert(1)</script></p>"},
        {"id": 2, "order": 3, "text": "<p><img src=\"/media/uploads/a.png\"></p>"}
    ],
    "images": [
        {"id": 7, "order": 2, "image": "/media/uploads/b.png", "text": "<em>зураг</em>"},
        {"id": 8, "order": 4, "image": "/media/uploads/banner.png", "text": null}
    ]
}"#;

pub const HISTORY_PAGE_JSON: &str = r#"{
    "id": "c3d4",
    "title": "Түүх",
    "subtitle": "1990 оноос",
    "description": null,
    "slug": "history",
    "template": "default",
    "is_published": true,
    "contents": [
        {
            "id": 11,
            "title": "Үүсэл",
            "texts": [{"id": 3, "order": 1, "text": "<p>Сургууль байгуулагдсан</p>"}],
            "images": [{"id": 9, "order": 2, "image": null, "image_url": null}]
        }
    ],
    "children": []
}"#;

pub const TAGS_JSON: &str = r#"{
    "count": 2,
    "results": [
        {"id": 1, "name": "Мэдээ", "slug": "news"},
        {"id": 2, "name": "Арга хэмжээ", "slug": "events"}
    ]
}"#;

pub const NEWS_JSON: &str = r#"{
    "count": 1,
    "results": [
        {
            "id": 5,
            "title": "Элсэлт 2025",
            "description": "<p>Элсэлтийн <b>журам</b></p>",
            "image": {"id": 7, "order": 1, "image": "/media/uploads/b.png"},
            "tags": [{"id": 1, "name": "Мэдээ", "slug": "news"}],
            "created_at": "2025-03-01T09:30:00+08:00"
        }
    ]
}"#;

pub const CAROUSEL_JSON: &str = r#"{
    "count": 2,
    "results": [
        {"id": 1, "title": "Тавтай морил", "description": "КОСЕН", "images": [{"id": 1, "order": 0, "image": "/media/carousel/1.jpg"}]},
        {"id": 2, "title": "Элсэлт", "description": "", "images": []}
    ]
}"#;

pub const VIDEOS_JSON: &str = r#"{
    "count": 1,
    "results": [
        {"id": 1, "title": "Танилцуулга", "url": "https://www.youtube.com/watch?v=abc123", "video_file": null, "video_source": "youtube"}
    ]
}"#;

pub const LINKS_JSON: &str = r#"{
    "count": 2,
    "results": [
        {"id": 2, "title": "Оюутны веб", "url": "http://example.mn/student", "order": 2},
        {"id": 1, "title": "Багшийн веб", "url": "http://example.mn/teacher", "order": 1}
    ]
}"#;

/// Respond to `GET /api/{resource}` with a JSON body
pub async fn mount_json(server: &MockServer, resource: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{resource}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"),
        )
        .mount(server)
        .await;
}

/// Mount every resource the site reads
pub async fn mount_backend(server: &MockServer) {
    mount_json(server, "page-navigation/", NAVIGATION_JSON).await;
    mount_json(server, "contents/5/", CONTENT_JSON).await;
    mount_json(server, "pages/c3d4/", HISTORY_PAGE_JSON).await;
    mount_json(server, "tags/", TAGS_JSON).await;
    mount_json(server, "carousel/", CAROUSEL_JSON).await;
    mount_json(server, "videos/", VIDEOS_JSON).await;
    mount_json(server, "urls/", LINKS_JSON).await;

    Mock::given(method("GET"))
        .and(path("/api/contents/"))
        .and(query_param("tag", "news"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(NEWS_JSON.to_string(), "application/json"),
        )
        .mount(server)
        .await;
}

/// Configuration pointing at the mock server
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/api/", server.uri());
    config.api.request_timeout_secs = 2;
    config.media.base_url = MEDIA_URL.to_string();
    config.site.locale = "en".to_string();
    config
}

/// Router backed by the mock server, with an in-process cache and fast retries
pub fn test_router(server: &MockServer) -> Router {
    let config = test_config(server);
    let client = ApiClient::with_retry(&config.api, RetryConfig::with_delays(1, 1, 5))
        .expect("client");
    let cache = QueryCache::in_memory(&config.cache);
    let state = AppState::new(config, Arc::new(client), Arc::new(cache)).expect("state");
    create_router(state)
}

/// Send a GET request and return status and body
pub async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

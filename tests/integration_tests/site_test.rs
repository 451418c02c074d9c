//! Rendered site tests
//!
//! Drives the router with `oneshot` against a wiremock content API.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;
use wiremock::MockServer;

use super::fixtures::{get, mount_backend, test_router, MEDIA_URL};

#[tokio::test]
async fn test_content_detail_renders_plan() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, html) = get(test_router(&server), "/content/5").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Элсэлт 2025"));
    assert!(!html.contains("<script>alert"));
    // Inline media references point at the media host
    assert!(html.contains(&format!(r#"src="{MEDIA_URL}/media/uploads/a.png""#)));
    // The last image is the banner and is not repeated in the body
    assert_eq!(html.matches("/media/uploads/banner.png").count(), 1);
    assert!(html.contains(r#"class="banner" id="image-8""#));

    let text_1 = html.find(r#"id="text-1""#).expect("text-1");
    let image_7 = html.find(r#"id="image-7""#).expect("image-7");
    let text_2 = html.find(r#"id="text-2""#).expect("text-2");
    assert!(text_1 < image_7 && image_7 < text_2);
}

#[tokio::test]
async fn test_invalid_content_id_is_rejected_before_fetch() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, _) = get(test_router(&server), "/content/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/api/contents/")));
}

#[tokio::test]
async fn test_missing_content_is_not_found() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, _) = get(test_router(&server), "/content/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_by_nested_slug() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, html) = get(test_router(&server), "/page/history").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("1990 оноос"));
    assert!(html.contains("Сургууль байгуулагдсан"));
    // Breadcrumbs lead through the parent page
    assert!(html.contains(r#"<a href="/page/about">Бидний тухай</a>"#));
    // Section images without a source are shown as unavailable
    assert!(html.contains("image-unavailable"));
}

#[tokio::test]
async fn test_unknown_page_slug() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, _) = get(test_router(&server), "/page/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_page() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, html) = get(test_router(&server), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&format!("{MEDIA_URL}/media/carousel/1.jpg")));
    assert!(html.contains("/images/banner.jpg"));
    assert!(html.contains("https://www.youtube.com/embed/abc123"));
    assert!(html.contains(r#"href="/content/5""#));
    assert!(html.contains(r#"href="/contents/news""#));

    // Sidebar links are ordered by `order`
    let teacher = html.find("Багшийн веб").expect("first link");
    let student = html.find("Оюутны веб").expect("second link");
    assert!(teacher < student);
}

#[tokio::test]
async fn test_contents_redirects_to_first_tag() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let response = test_router(&server)
        .oneshot(Request::builder().uri("/contents").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/contents/news"
    );
}

#[tokio::test]
async fn test_contents_listing() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, html) = get(test_router(&server), "/contents/news").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("2025-03-01"));
    assert!(html.contains(&format!("{MEDIA_URL}/media/uploads/b.png")));
    // Card descriptions are plain text
    assert!(html.contains("Элсэлтийн журам"));
}

#[tokio::test]
async fn test_register_validation() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let request = |body: &'static str| {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    };

    let response = test_router(&server)
        .oneshot(request("name=Bat&email=bat%40example.mn&program=it"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_router(&server)
        .oneshot(request("name=&email=nope&program=law"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health_and_cache_invalidation() {
    let server = MockServer::start().await;
    mount_backend(&server).await;
    let router = test_router(&server);

    // Warm the cache
    let (status, _) = get(router.clone(), "/content/5").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(router.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["cache"]["shared"], false);
    // The test router never registers the Prometheus collectors
    assert_eq!(health["metrics_enabled"], false);
    let hit_rate = health["cache_hit_rate"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&hit_rate));

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/invalidate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"prefix": "content"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let removed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(removed["prefix"], "content");
    assert_eq!(removed["removed"]["local"], 1);
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let (status, html) = get(test_router(&server), "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("404"));
}

//! Error scenario integration tests
//!
//! Tests failure modes of the content API and how pages degrade:
//! 1. Optional resources failing (navigation, links, listings, carousel)
//! 2. Required resources failing (content, page)
//! 3. Timeouts and malformed bodies

use axum::http::StatusCode;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{get, mount_json, test_router, CONTENT_JSON, NAVIGATION_JSON};

/// Fail every request that no other mock answers
async fn mount_failing_fallback(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .with_priority(10)
        .mount(server)
        .await;
}

// ============================================================================
// Optional resources
// ============================================================================

#[tokio::test]
async fn test_content_renders_without_navigation() {
    let server = MockServer::start().await;
    mount_json(&server, "contents/5/", CONTENT_JSON).await;
    mount_failing_fallback(&server, 500).await;

    let (status, html) = get(test_router(&server), "/content/5").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Элсэлт 2025"));
    // Configured links replace the failing links endpoint
    assert!(html.contains("https://www.must.edu.mn/mn/"));
}

#[tokio::test]
async fn test_listing_degrades_to_empty() {
    let server = MockServer::start().await;
    mount_failing_fallback(&server, 502).await;

    let (status, html) = get(test_router(&server), "/contents/news").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="empty""#));
}

#[tokio::test]
async fn test_home_survives_carousel_failure() {
    let server = MockServer::start().await;
    mount_failing_fallback(&server, 500).await;

    let (status, html) = get(test_router(&server), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="notice""#));
}

#[tokio::test]
async fn test_contents_index_without_tags() {
    let server = MockServer::start().await;
    mount_failing_fallback(&server, 500).await;

    let (status, _) = get(test_router(&server), "/contents").await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Required resources
// ============================================================================

#[tokio::test]
async fn test_content_server_error_is_bad_gateway() {
    let server = MockServer::start().await;
    mount_failing_fallback(&server, 500).await;

    let (status, html) = get(test_router(&server), "/content/5").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(html.contains("502"));
}

#[tokio::test]
async fn test_malformed_content_is_bad_gateway() {
    let server = MockServer::start().await;
    mount_json(&server, "contents/5/", r#"{"id": "five", "texts": 3}"#).await;

    let (status, _) = get(test_router(&server), "/content/5").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_content_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contents/5/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(CONTENT_JSON.to_string(), "application/json")
                .set_delay(Duration::from_secs(5)), // Longer than the 2s timeout
        )
        .mount(&server)
        .await;

    let (status, _) = get(test_router(&server), "/content/5").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_page_fetch_failure() {
    let server = MockServer::start().await;
    mount_json(&server, "page-navigation/", NAVIGATION_JSON).await;
    mount_failing_fallback(&server, 500).await;

    let (status, _) = get(test_router(&server), "/page/about").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let server = MockServer::start().await;
    let router = test_router(&server);

    Mock::given(method("GET"))
        .and(path("/api/contents/5/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    let (status, _) = get(router.clone(), "/content/5").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    mount_json(&server, "contents/5/", CONTENT_JSON).await;

    let (status, _) = get(router, "/content/5").await;
    assert_eq!(status, StatusCode::OK);
}

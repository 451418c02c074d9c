//! Page and operator routes
//!
//! Page handlers render HTML through [`SiteTemplates`](super::SiteTemplates);
//! any error becomes an error page with the status from
//! [`Error::status_code`].

use axum::{
    extract::{MatchedPath, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};

use super::server::AppState;
use super::views::{
    select_tag, ContactView, ContentDetailView, ContentListView, ErrorView, HomeView, PageView,
    RegistrationForm, RegistrationView,
};
use crate::cache::{CacheStats, Invalidation};
use crate::error::{Error, SiteErrorTrait};
use crate::i18n::t;
use crate::metrics;
use crate::navigation::tag_href;
use crate::utils::error::FetchError;
use crate::utils::parse_content_id;

// ============================================================================
// Router
// ============================================================================

/// All site routes with their shared state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(home))
        .route("/contents", get(contents_index))
        .route("/contents/{slug}", get(contents_by_tag))
        .route("/content/{id}", get(content_detail))
        .route("/page/{slug}", get(page_detail))
        .route("/contact", get(contact))
        .route("/register", get(register_form).post(register_submit))
        // Operator endpoints
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_export))
        .route("/cache/invalidate", post(invalidate_cache))
        .route_layer(middleware::from_fn(track_request))
        .fallback(not_found)
        .with_state(state)
}

/// Record duration and status of every matched route
async fn track_request(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    metrics::record_page_request(
        &route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

// ============================================================================
// Rendering helpers
// ============================================================================

async fn render_page<T: Serialize>(
    state: &AppState,
    status: StatusCode,
    template: &str,
    title: &str,
    active_slug: Option<&str>,
    view: &T,
) -> Response {
    let layout = state.layout(title, active_slug).await;

    match state.templates.render(template, &layout, view) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(template = %template, error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, e.localized_desc()).into_response()
        }
    }
}

async fn error_page(state: &AppState, err: Error) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, category = ?err.category(), "Request failed");
    } else {
        warn!(error = %err, "Request rejected");
    }

    let view = ErrorView::new(status.as_u16(), err.localized_desc());
    render_page(state, status, "error", &view.title, None, &view).await
}

async fn not_found(State(state): State<AppState>) -> Response {
    error_page(&state, Error::Fetch(FetchError::NotFound("route".to_string()))).await
}

// ============================================================================
// Page handlers
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct HomeQuery {
    tag: Option<String>,
}

/// Home page: carousel, intro, videos and the tag news carousel
async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Response {
    let service = &state.service;
    let pipeline = service.pipeline();

    let (carousel, videos, tags) =
        tokio::join!(service.carousel(), service.videos(), service.tags());

    let carousel = match carousel {
        Ok(items) => Some(items),
        Err(e) => {
            warn!(error = %e, "Carousel unavailable");
            None
        }
    };

    let selected = select_tag(&tags, query.tag.as_deref()).cloned();
    let news = match &selected {
        Some(tag) => service
            .contents_by_tag(&tag.slug)
            .await
            .iter()
            .map(|summary| pipeline.card(summary))
            .collect(),
        None => Vec::new(),
    };

    let view = HomeView::new(
        pipeline,
        carousel.as_deref(),
        &videos,
        &tags,
        selected.as_ref(),
        news,
    );
    let title = state.config.site.name.clone();
    render_page(&state, StatusCode::OK, "home", &title, None, &view).await
}

/// Redirect to the first tag's listing
async fn contents_index(State(state): State<AppState>) -> Response {
    let tags = state.service.tags().await;

    match tags.first() {
        Some(tag) => Redirect::to(&tag_href(&tag.slug)).into_response(),
        None => {
            let view = ContentListView::new(&[], "", Vec::new());
            render_page(&state, StatusCode::OK, "contents", &view.title, None, &view).await
        }
    }
}

async fn contents_by_tag(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let service = &state.service;
    let (tags, summaries) = tokio::join!(service.tags(), service.contents_by_tag(&slug));

    let cards = summaries
        .iter()
        .map(|summary| service.pipeline().card(summary))
        .collect();

    let view = ContentListView::new(&tags, &slug, cards);
    render_page(&state, StatusCode::OK, "contents", &view.title, None, &view).await
}

/// Content detail; the id is validated before anything is fetched
async fn content_detail(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let id = match parse_content_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return error_page(&state, e.into()).await,
    };

    match state.service.content(id).await {
        Ok(content) => {
            let view = ContentDetailView::new(state.service.pipeline(), &content);
            render_page(&state, StatusCode::OK, "content", &view.title, None, &view).await
        }
        Err(e) => error_page(&state, e).await,
    }
}

async fn page_detail(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.service.page_by_slug(&slug).await {
        Ok(resolved) => {
            let view = PageView::new(state.service.pipeline(), &resolved.page, &resolved.tree);
            render_page(&state, StatusCode::OK, "page", &view.title, Some(&slug), &view).await
        }
        Err(e) => error_page(&state, e).await,
    }
}

async fn contact(State(state): State<AppState>) -> Response {
    let view = ContactView::new(&state.config.site);
    render_page(&state, StatusCode::OK, "contact", &view.title, None, &view).await
}

async fn register_form(State(state): State<AppState>) -> Response {
    let view = RegistrationView::empty();
    render_page(&state, StatusCode::OK, "register", &view.labels.title, None, &view).await
}

/// Validate a registration; nothing is stored
async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let program = form.program.clone();
    let view = RegistrationView::submitted(form);

    let status = if view.is_success() {
        info!(program = %program, "Registration received");
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    render_page(&state, status, "register", &view.labels.title, None, &view).await
}

// ============================================================================
// Operator handlers
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub cache_healthy: bool,
    pub cache: CacheStats,
    pub cache_hit_rate: f64,
    /// Whether `/metrics` has a registry to export
    pub metrics_enabled: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.service.cache();
    let cache_healthy = cache.health_check().await;
    let stats = cache.stats().await;

    Json(HealthResponse {
        status: if cache_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cache_healthy,
        cache_hit_rate: stats.hit_rate(),
        cache: stats,
        metrics_enabled: metrics::metrics_initialized(),
    })
}

async fn metrics_export() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, t!("errors.render").to_string()).into_response()
        }
    }
}

/// Cache invalidation request; no prefix clears every key
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub prefix: String,
    pub removed: Invalidation,
}

async fn invalidate_cache(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> Json<InvalidateResponse> {
    let prefix = request.prefix.as_deref().map(str::trim).unwrap_or_default();
    let removed = state.service.cache().invalidate_prefix(prefix).await;

    Json(InvalidateResponse {
        prefix: prefix.to_string(),
        removed,
    })
}

//! Site server
//!
//! Wires configuration, the content API client, the query cache and the
//! templates into one [`AppState`] and serves the router.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes::create_router;
use super::service::SiteService;
use super::templates::SiteTemplates;
use super::views::LayoutView;
use crate::cache::QueryCache;
use crate::client::{ApiClient, ContentApi};
use crate::config::Config;
use crate::content::ContentPipeline;
use crate::error::{Error, Result};

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Cached content access
    pub service: Arc<SiteService>,

    /// Compiled page templates
    pub templates: Arc<SiteTemplates>,

    /// Configuration
    pub config: Arc<Config>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Assemble state around an existing API implementation
    pub fn new(config: Config, api: Arc<dyn ContentApi>, cache: Arc<QueryCache>) -> Result<Self> {
        let pipeline = ContentPipeline::from_config(&config.media);

        Ok(Self {
            service: Arc::new(SiteService::new(api, cache, pipeline)),
            templates: Arc::new(SiteTemplates::new()?),
            config: Arc::new(config),
            start_time: Instant::now(),
        })
    }

    /// Shared layout with navigation and sidebar links
    pub async fn layout(&self, title: &str, active_slug: Option<&str>) -> LayoutView {
        let (tree, links) = tokio::join!(self.service.navigation(), self.service.links());
        LayoutView::new(&self.config.site, &tree, active_slug, links, title)
    }
}

// ============================================================================
// Site Server
// ============================================================================

/// HTTP server for the site
pub struct SiteServer {
    state: AppState,
}

impl SiteServer {
    /// Create a server backed by the configured content API
    ///
    /// Connects to Redis when configured; an unreachable Redis leaves the
    /// in-process cache in place.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let api = ApiClient::new(&config.api)?;
        let cache = QueryCache::connect(&config.cache).await;

        let state = AppState::new(config, Arc::new(api), Arc::new(cache))?;
        Ok(Self { state })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let server = &self.state.config.server;

        let static_dir = server.static_dir.as_path();
        let mut router = create_router(self.state.clone())
            .nest_service("/images", ServeDir::new(static_dir.join("images")))
            .nest_service("/static", ServeDir::new(static_dir));

        // Add CORS layer if enabled
        if server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        // Add tracing layer if enabled
        if server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();
        let addr = self.state.config.bind_address();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::with_source(format!("Failed to bind to {addr}"), e))?;

        tracing::info!(
            addr = %addr,
            api = %self.state.config.api.base_url,
            shared_cache = self.state.service.cache().is_shared(),
            "Starting site server"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("Site server shutdown complete");
        Ok(())
    }
}

/// Resolve on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

//! kosen-web - Server-rendered front-end for the KOOSEN college site
//!
//! Pages are rendered on the server from a remote content API. Rich-text
//! and image blocks go through one content pipeline before they reach a
//! template.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`client`] - Content API client with rate limiting and retries
//! - [`models`] - API data structures
//! - [`content`] - Block merging, banner extraction, media rewriting and sanitization
//! - [`navigation`] - Static page tree, menu and breadcrumbs
//! - [`cache`] - Two-tier query cache (moka, optional Redis)
//! - [`site`] - Page views, templates, routes and the HTTP server
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use kosen_web::config::Config;
//! use kosen_web::site::SiteServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = SiteServer::new(config).await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod cache;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod models;
pub mod navigation;
pub mod site;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::QueryCache;
    pub use crate::client::{ApiClient, ContentApi};
    pub use crate::config::Config;
    pub use crate::content::{ContentPipeline, RenderPlan, RenderUnit};
    pub use crate::error::{Error, ErrorCategory, Result, SiteErrorTrait};
    pub use crate::models::{Content, ImageBlock, Page, PageNode, TextBlock};
    pub use crate::navigation::PageTree;
    pub use crate::site::{AppState, SiteServer};
}

// Direct re-exports for convenience
pub use models::{Content, ImageBlock, TextBlock};

//! Server-rendered site
//!
//! - [`SiteService`] fetches through the query cache with per-resource
//!   failure handling
//! - [`views`] turns API data into template data
//! - [`SiteTemplates`] renders pages inside the shared layout
//! - [`SiteServer`] serves the routes

pub mod routes;
pub mod server;
pub mod service;
pub mod templates;
pub mod views;

pub use routes::create_router;
pub use server::{shutdown_signal, AppState, SiteServer};
pub use service::{ResolvedPage, SiteService};
pub use templates::SiteTemplates;

//! Content API access
//!
//! [`ContentApi`] is the seam between the site and the CMS backend. The
//! server uses [`ApiClient`]; tests can substitute any implementation.

pub mod fetcher;

pub use fetcher::ApiClient;

use async_trait::async_trait;

use crate::models::{
    CarouselItem, Content, ContentSummary, ImportantLink, Page, PageNode, Tag, Video,
};
use crate::utils::error::FetchError;

/// Read-only view of the CMS resources the site renders
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Root nodes of the static page tree (`page-navigation/`)
    async fn navigation(&self) -> Result<Vec<PageNode>, FetchError>;

    /// One static page with its contents (`pages/{id}/`)
    async fn page(&self, id: &str) -> Result<Page, FetchError>;

    /// One content item (`contents/{id}/`)
    async fn content(&self, id: u64) -> Result<Content, FetchError>;

    /// Content listing for a tag (`contents/?tag={slug}`)
    async fn contents_by_tag(&self, slug: &str) -> Result<Vec<ContentSummary>, FetchError>;

    async fn tags(&self) -> Result<Vec<Tag>, FetchError>;

    async fn carousel(&self) -> Result<Vec<CarouselItem>, FetchError>;

    async fn videos(&self) -> Result<Vec<Video>, FetchError>;

    /// Sidebar links (`urls/`)
    async fn links(&self) -> Result<Vec<ImportantLink>, FetchError>;
}

//! Data access for page handlers
//!
//! Wraps the content API with the query cache and applies the failure
//! policy per resource: navigation, tags, listings, videos and links
//! degrade to empty lists, while pages, contents and the carousel
//! propagate their errors to the handler.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::cache::QueryCache;
use crate::client::ContentApi;
use crate::content::ContentPipeline;
use crate::error::{Error, Result};
use crate::models::{
    CarouselItem, Content, ContentSummary, ImportantLink, Page, PageNode, Tag, Video,
};
use crate::navigation::PageTree;
use crate::utils::error::{FetchError, RouteError};

/// Static page resolved from its slug
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub page: Page,
    pub tree: PageTree,
}

/// Cached, policy-aware access to the content API
pub struct SiteService {
    api: Arc<dyn ContentApi>,
    cache: Arc<QueryCache>,
    pipeline: ContentPipeline,
}

impl SiteService {
    pub fn new(api: Arc<dyn ContentApi>, cache: Arc<QueryCache>, pipeline: ContentPipeline) -> Self {
        Self {
            api,
            cache,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &ContentPipeline {
        &self.pipeline
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Fetch through the cache, replacing any failure with an empty list
    async fn lenient<T, F, Fut>(&self, resource: &str, key: String, fetch: F) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<T>, FetchError>>,
    {
        match self.cache.get_or_fetch(&key, fetch).await {
            Ok(items) => items,
            Err(e) => {
                warn!(resource = %resource, error = %e, "Content API failed, rendering without it");
                Vec::new()
            }
        }
    }

    pub async fn navigation(&self) -> PageTree {
        let key = self.cache.key(&["navigation"]);
        let roots: Vec<PageNode> = self
            .lenient("page-navigation", key, || self.api.navigation())
            .await;
        PageTree::new(roots)
    }

    pub async fn tags(&self) -> Vec<Tag> {
        let key = self.cache.key(&["tags"]);
        self.lenient("tags", key, || self.api.tags()).await
    }

    pub async fn contents_by_tag(&self, slug: &str) -> Vec<ContentSummary> {
        let key = self.cache.key(&["contents", "tag", slug]);
        self.lenient("contents", key, || self.api.contents_by_tag(slug))
            .await
    }

    pub async fn videos(&self) -> Vec<Video> {
        let key = self.cache.key(&["videos"]);
        self.lenient("videos", key, || self.api.videos()).await
    }

    /// Sidebar links ordered by their `order` field
    pub async fn links(&self) -> Vec<ImportantLink> {
        let key = self.cache.key(&["links"]);
        let mut links = self.lenient("urls", key, || self.api.links()).await;
        links.sort_by_key(|link| link.order);
        links
    }

    pub async fn content(&self, id: u64) -> Result<Content> {
        let key = self.cache.key(&["content", &id.to_string()]);
        Ok(self
            .cache
            .get_or_fetch(&key, || self.api.content(id))
            .await?)
    }

    pub async fn page(&self, id: &str) -> Result<Page> {
        let key = self.cache.key(&["page", id]);
        Ok(self.cache.get_or_fetch(&key, || self.api.page(id)).await?)
    }

    pub async fn carousel(&self) -> Result<Vec<CarouselItem>> {
        let key = self.cache.key(&["carousel"]);
        Ok(self
            .cache
            .get_or_fetch(&key, || self.api.carousel())
            .await?)
    }

    /// Locate a page by slug in the navigation tree and fetch it
    ///
    /// # Errors
    ///
    /// `RouteError::UnknownPage` when no node carries `slug`, otherwise
    /// whatever the page fetch returns.
    pub async fn page_by_slug(&self, slug: &str) -> Result<ResolvedPage> {
        let tree = self.navigation().await;

        let id = tree
            .find_by_slug(slug)
            .map(|node| node.id.clone())
            .ok_or_else(|| Error::Route(RouteError::UnknownPage(slug.to_string())))?;

        let page = self.page(&id).await?;
        Ok(ResolvedPage { page, tree })
    }
}

//! HTTP client for the content API
//!
//! Every request goes through:
//! - a governor rate limiter
//! - retry with exponential backoff on transient failures
//! - status classification (404 is `NotFound`, other failures are errors)
//! - JSON decoding into the caller's type

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client, StatusCode,
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use tracing::{debug, instrument};
use url::Url;

use super::ContentApi;
use crate::config::ApiConfig;
use crate::metrics;
use crate::models::{
    CarouselItem, Content, ContentSummary, ImportantLink, Page, PageNode, Paginated, Tag, Video,
};
use crate::utils::encode_path_segment;
use crate::utils::error::FetchError;
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Content API client
pub struct ApiClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Base URL, always ending in `/`
    base_url: Url,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Retry policy for transient failures
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a client from the API configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for an unparsable base URL and
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        Self::with_retry(config, RetryConfig::new(config.max_retries))
    }

    /// Create a client with an explicit retry policy
    pub fn with_retry(config: &ApiConfig, retry: RetryConfig) -> Result<Self, FetchError> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .default_headers(headers)
            .build()?;

        let rate = NonZeroU32::new(config.rate_limit).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            base_url,
            rate_limiter,
            retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a resource path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidUrl(format!("{path}: {e}")))
    }

    /// GET a resource and decode its JSON body
    ///
    /// `resource` labels the request in logs and metrics.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: Url,
    ) -> Result<T, FetchError> {
        self.rate_limiter.until_ready().await;

        let _timer = metrics::start_fetch_timer(resource);
        let result = with_retry_if(
            &self.retry,
            || self.fetch_once::<T>(&url),
            FetchError::is_transient,
        )
        .await;

        metrics::record_api_fetch(resource, outcome_label(&result));
        result
    }

    /// GET a paginated collection and return its `results`
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: Url,
    ) -> Result<Vec<T>, FetchError> {
        let page: Paginated<T> = self.get_json(resource, url).await?;
        Ok(page.results)
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        debug!(status = status.as_u16(), "Content API responded");

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify_request_error)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "{raw}: unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(url)
}

fn classify_request_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(error)
    }
}

fn outcome_label<T>(result: &Result<T, FetchError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(FetchError::NotFound(_)) => "not_found",
        Err(FetchError::Timeout) => "timeout",
        Err(FetchError::Decode(_)) => "decode_error",
        Err(_) => "error",
    }
}

#[async_trait::async_trait]
impl ContentApi for ApiClient {
    async fn navigation(&self) -> Result<Vec<PageNode>, FetchError> {
        self.get_list("page-navigation", self.endpoint("page-navigation/")?)
            .await
    }

    async fn page(&self, id: &str) -> Result<Page, FetchError> {
        let path = format!("pages/{}/", encode_path_segment(id));
        self.get_json("pages", self.endpoint(&path)?).await
    }

    async fn content(&self, id: u64) -> Result<Content, FetchError> {
        self.get_json("contents", self.endpoint(&format!("contents/{id}/"))?)
            .await
    }

    async fn contents_by_tag(&self, slug: &str) -> Result<Vec<ContentSummary>, FetchError> {
        let mut url = self.endpoint("contents/")?;
        url.query_pairs_mut().append_pair("tag", slug);
        self.get_list("contents", url).await
    }

    async fn tags(&self) -> Result<Vec<Tag>, FetchError> {
        self.get_list("tags", self.endpoint("tags/")?).await
    }

    async fn carousel(&self) -> Result<Vec<CarouselItem>, FetchError> {
        self.get_list("carousel", self.endpoint("carousel/")?).await
    }

    async fn videos(&self) -> Result<Vec<Video>, FetchError> {
        self.get_list("videos", self.endpoint("videos/")?).await
    }

    async fn links(&self) -> Result<Vec<ImportantLink>, FetchError> {
        self.get_list("urls", self.endpoint("urls/")?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new(&config("http://localhost:8000/api")).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            client.endpoint("contents/5/").unwrap().as_str(),
            "http://localhost:8000/api/contents/5/"
        );
        assert_eq!(
            client.endpoint("/tags/").unwrap().as_str(),
            "http://localhost:8000/api/tags/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new(&config("not a url")),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new(&config("ftp://example.com/")),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label::<()>(&Ok(())), "ok");
        assert_eq!(
            outcome_label::<()>(&Err(FetchError::NotFound("x".into()))),
            "not_found"
        );
        assert_eq!(outcome_label::<()>(&Err(FetchError::ServerError(500))), "error");
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("a1b2"), "a1b2");
        assert_eq!(encode_path_segment("a/b"), "a%2Fb");
    }
}

//! Error types for the kosen-web front-end
//!
//! This module defines the domain errors raised at the two places where
//! a request can actually fail: talking to the content API, and turning
//! route parameters into typed identifiers.

use thiserror::Error;

/// Errors that can occur while fetching from the content API
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource does not exist (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Non-success status that is not a 404
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded into the expected shape
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether the same request may succeed if tried again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Timeout => true,
            Self::NotFound(_)
            | Self::Decode(_)
            | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors raised while interpreting route parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Identifier segment is not a valid numeric id
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Slug does not match any page in the navigation tree
    #[error("Unknown page: {0}")]
    UnknownPage(String),
}

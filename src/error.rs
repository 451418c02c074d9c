//! Unified error handling for the kosen-web crate
//!
//! This module provides a unified error type that consolidates the domain
//! errors into a single `Error` enum, while keeping the domain errors
//! usable on their own.
//!
//! # Architecture
//!
//! - [`SiteErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use kosen_web::error::{Error, SiteErrorTrait};
//!
//! fn describe(err: &Error) -> (u16, String) {
//!     (err.status_code(), err.localized_desc())
//! }
//! ```

use std::io;
use thiserror::Error;

use crate::i18n::t;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{FetchError, RouteError};

/// Common trait for all kosen-web error types
pub trait SiteErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a retry may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get localized description for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Content API errors (HTTP, timeout, bad status)
    Network,
    /// Malformed or unknown route parameters
    Routing,
    /// Template and response rendering errors
    Rendering,
    /// Configuration and validation errors
    Config,
    /// I/O errors
    Storage,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Network => t!("errors.category.network").to_string(),
            Self::Routing => t!("errors.category.routing").to_string(),
            Self::Rendering => t!("errors.category.rendering").to_string(),
            Self::Config => t!("errors.category.config").to_string(),
            Self::Storage => t!("errors.category.storage").to_string(),
            Self::Other => t!("errors.category.other").to_string(),
        }
    }
}

impl SiteErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        self.is_transient()
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::NotFound(_) => t!("errors.fetch.not_found").to_string(),
            Self::Timeout => t!("errors.fetch.timeout").to_string(),
            _ => t!("errors.fetch.unavailable").to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl SiteErrorTrait for RouteError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::InvalidId(id) => t!("errors.route.invalid_id", id = id).to_string(),
            Self::UnknownPage(slug) => t!("errors.route.unknown_page", slug = slug).to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Routing
    }
}

/// Unified error type for the kosen-web crate
#[derive(Error, Debug)]
pub enum Error {
    /// Content API errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Route parameter errors
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Template registration errors
    #[error("Template registration error: {0}")]
    TemplateRegistration(#[from] Box<handlebars::TemplateError>),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SiteErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Route(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Template(_)
            | Self::TemplateRegistration(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other { .. } => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Fetch(e) => e.localized_desc(),
            Self::Route(e) => e.localized_desc(),
            Self::Template(_) | Self::TemplateRegistration(_) => t!("errors.render").to_string(),
            Self::Io(e) => format!("{}: {e}", t!("errors.io")),
            Self::Json(e) => format!("{}: {e}", t!("errors.json")),
            Self::Config(msg) => format!("{}: {msg}", t!("errors.config")),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Route(_) => ErrorCategory::Routing,
            Self::Template(_) | Self::TemplateRegistration(_) | Self::Json(_) => {
                ErrorCategory::Rendering
            }
            Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status a page failing with this error is served with
    ///
    /// Missing resources are 404, malformed ids 400, any other upstream
    /// failure 502.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Fetch(FetchError::NotFound(_)) => 404,
            Self::Fetch(_) => 502,
            Self::Route(RouteError::InvalidId(_)) => 400,
            Self::Route(RouteError::UnknownPage(_)) => 404,
            _ => 500,
        }
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::TemplateRegistration(Box::new(err))
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

//! Configuration management for kosen-web
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::content::{DEFAULT_BANNER_IMAGE, DEFAULT_MEDIA_URL, DEFAULT_PLACEHOLDER_IMAGE};
use crate::utils::normalize_origin;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Content API configuration
    pub api: ApiConfig,

    /// Media host configuration
    pub media: MediaConfig,

    /// Query cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Site-wide static information
    pub site: SiteConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Enable request tracing
    pub enable_request_logging: bool,

    /// Directory holding `images/` and other static assets
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 3000,
            enable_cors: false,
            enable_request_logging: true,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Rate limit (requests per second)
    pub rate_limit: u32,

    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8000/api/"),
            request_timeout_secs: 10,
            max_retries: 1,
            rate_limit: 50,
            user_agent: format!("kosen-web/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Per-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Media host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Origin serving `/media/...` uploads
    pub base_url: String,

    /// Image used for cards and details without an image
    pub placeholder_image: String,

    /// Image used for carousel slides without an image
    pub banner_image: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_MEDIA_URL),
            placeholder_image: String::from(DEFAULT_PLACEHOLDER_IMAGE),
            banner_image: String::from(DEFAULT_BANNER_IMAGE),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Static link shown when the API has none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub title: String,
    pub url: String,
}

impl LinkConfig {
    fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

/// Site-wide static information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name shown in the header and page titles
    pub name: String,

    /// UI locale (mn, en)
    pub locale: String,

    /// Postal address on the contact page
    pub address: String,

    /// Phone numbers on the contact page
    pub phones: Vec<String>,

    /// Contact email
    pub email: String,

    /// Embedded map URL on the contact page
    pub map_embed_url: String,

    /// Social page linked from the footer
    pub facebook_url: String,

    /// Sidebar links used when `urls/` returns nothing
    pub fallback_links: Vec<LinkConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: String::from("ШУТИС-КОСЕН"),
            locale: String::from("mn"),
            address: String::from("Монгол Улс, Улаанбаатар хот Бага тойруу, ШУТИС VIII-байр"),
            phones: vec![String::from("(976)-77110096"), String::from("(976)-77110097")],
            email: String::from("must-kosen@must.edu.mn"),
            map_embed_url: String::from(
                "https://www.google.com/maps/embed?pb=!1m18!1m12!1m3!1d1585.8068208035486!2d106.92600803631959!3d47.92159791249783!2m3!1f0!2f0!3f0!3m2!1i1024!2i768!4f13.1!3m3!1m2!1s0x5d96930065aab635%3A0xe8a59c9f75c0187d!5e1!3m2!1sen!2smn",
            ),
            facebook_url: String::from("https://www.facebook.com/mustkosen"),
            fallback_links: vec![
                LinkConfig::new("Багшийн веб", "http://203.217.139.9/kteacher/"),
                LinkConfig::new(
                    "Оюутны веб",
                    "http://203.217.139.9/kouytan/Login?ReturnUrl=%2fkouytan",
                ),
                LinkConfig::new("ШУТИС-ийн веб", "https://www.must.edu.mn/mn/"),
            ],
        }
    }
}

/// Read and parse an environment variable, falling back on absence or parse failure
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every setting has a default, so an empty environment yields
    /// [`Config::default`].
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let server = ServerConfig {
            host: env_or("KOSEN_HOST", defaults.server.host),
            port: env_or("KOSEN_PORT", defaults.server.port),
            enable_cors: env_or("KOSEN_ENABLE_CORS", defaults.server.enable_cors),
            enable_request_logging: env_or(
                "KOSEN_REQUEST_LOGGING",
                defaults.server.enable_request_logging,
            ),
            static_dir: env_or("KOSEN_STATIC_DIR", defaults.server.static_dir),
        };

        let api = ApiConfig {
            base_url: env_or("KOSEN_API_URL", defaults.api.base_url),
            request_timeout_secs: env_or("KOSEN_API_TIMEOUT", defaults.api.request_timeout_secs),
            max_retries: env_or("KOSEN_API_MAX_RETRIES", defaults.api.max_retries),
            rate_limit: env_or("KOSEN_API_RATE_LIMIT", defaults.api.rate_limit),
            user_agent: env_or("KOSEN_USER_AGENT", defaults.api.user_agent),
        };

        let media = MediaConfig {
            base_url: env_or("KOSEN_MEDIA_URL", defaults.media.base_url),
            ..defaults.media
        };

        let cache = CacheConfig {
            redis_url: std::env::var("KOSEN_REDIS_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            pool_size: env_or("KOSEN_REDIS_POOL_SIZE", defaults.cache.pool_size),
            ttl_secs: env_or("KOSEN_CACHE_TTL", defaults.cache.ttl_secs),
            max_capacity: env_or("KOSEN_CACHE_CAPACITY", defaults.cache.max_capacity),
            key_prefix: env_or("KOSEN_CACHE_PREFIX", defaults.cache.key_prefix),
        };

        let logging = LoggingConfig {
            level: env_or("KOSEN_LOG_LEVEL", defaults.logging.level),
            format: env_or("KOSEN_LOG_FORMAT", defaults.logging.format),
        };

        let site = SiteConfig {
            locale: env_or("KOSEN_LANG", defaults.site.locale),
            ..defaults.site
        };

        Ok(Self {
            server,
            api,
            media,
            cache,
            logging,
            site,
        })
    }

    /// Load configuration from a file
    ///
    /// Missing sections and keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        normalize_origin(&self.api.base_url).context("api.base_url must be an http(s) URL")?;
        normalize_origin(&self.media.base_url)
            .context("media.base_url must be an absolute http(s) URL")?;

        if self.api.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.cache.ttl_secs == 0 {
            anyhow::bail!("cache ttl_secs must be greater than 0");
        }

        if self.cache.max_capacity == 0 {
            anyhow::bail!("cache max_capacity must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Socket address string for the server to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

//! Media host handling
//!
//! The CMS stores uploads under relative `/media/...` paths. The site may
//! be served from a different origin than the media files, so these paths
//! are rewritten against a configured media base before rendering.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// Media host used when nothing is configured
pub const DEFAULT_MEDIA_URL: &str = "http://localhost:8000";

/// Path prefix the CMS uses for uploaded files
pub const MEDIA_PREFIX: &str = "/media";

/// `src` attribute whose value starts with `/media/`, in any quote style
///
/// The attribute name must follow whitespace or `/`, so `data-src` and
/// similar attributes are never touched.
static MEDIA_SRC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)((?:^|[\s/])src\s*=\s*)(["']?)(/media/)"#)
        .expect("valid media src pattern")
});

/// Rewrite relative media references in an HTML fragment
///
/// Every `src` value starting with `/media/` is prefixed with `media_base`,
/// keeping the original quoting. Absolute URLs, data URIs and other paths
/// are left alone, which also makes the rewrite idempotent. An empty base
/// returns the fragment unchanged.
///
/// # Examples
///
/// ```
/// use kosen_web::content::media::rewrite_media_urls;
///
/// let html = r#"<img src="/media/a.png">"#;
/// assert_eq!(
///     rewrite_media_urls(html, "http://cms.example"),
///     r#"<img src="http://cms.example/media/a.png">"#
/// );
/// ```
pub fn rewrite_media_urls(html: &str, media_base: &str) -> String {
    let base = media_base.trim().trim_end_matches('/');
    if html.is_empty() || base.is_empty() {
        return html.to_string();
    }

    MEDIA_SRC_REGEX
        .replace_all(html, |caps: &Captures| {
            format!("{}{}{}{}", &caps[1], &caps[2], base, &caps[3])
        })
        .into_owned()
}

/// Origin serving `/media/...` files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaBase(String);

impl MediaBase {
    /// Create a media base, dropping any trailing slash
    pub fn new(origin: impl AsRef<str>) -> Self {
        Self(origin.as_ref().trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rewrite `/media/` references inside an HTML fragment
    pub fn rewrite(&self, html: &str) -> String {
        rewrite_media_urls(html, &self.0)
    }

    /// Turn a raw image path into something a browser can load
    ///
    /// - missing or blank: `fallback`
    /// - starts with `/media`: prefixed with the media base
    /// - anything else: returned as is
    pub fn resolve(&self, raw: Option<&str>, fallback: &str) -> String {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => fallback.to_string(),
            Some(path) if path.starts_with(MEDIA_PREFIX) => format!("{}{}", self.0, path),
            Some(other) => other.to_string(),
        }
    }
}

impl Default for MediaBase {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_URL)
    }
}

impl std::fmt::Display for MediaBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

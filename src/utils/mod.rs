//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::utils::error::RouteError;

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Collapse every run of whitespace (including non-breaking spaces) into
/// one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// Truncate text to a maximum number of characters
///
/// Counts characters rather than bytes, so Cyrillic titles are never cut
/// in the middle of a code point.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Percent-encode a value for use as one URL path segment
///
/// Spaces become `%20`; `/`, `?`, `#` and every other reserved byte are
/// escaped.
pub fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Parse a route segment into a content id
///
/// Rejects anything that is not a plain non-negative integer, so a bad id
/// never reaches the API.
pub fn parse_content_id(raw: &str) -> Result<u64, RouteError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RouteError::InvalidId(raw.to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| RouteError::InvalidId(raw.to_string()))
}

/// Ensure a configured origin is an absolute http(s) URL
///
/// Returns the origin with any trailing slash removed.
pub fn normalize_origin(origin: &str) -> Result<String> {
    let parsed = Url::parse(origin.trim()).context("Invalid URL")?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Unsupported scheme: {}", parsed.scheme());
    }

    parsed.host_str().context("No host in URL")?;

    Ok(origin.trim().trim_end_matches('/').to_string())
}

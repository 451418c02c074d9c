//! HTML sanitization for CMS-authored fragments
//!
//! Text blocks and captions come straight from the CMS editor and are
//! treated as untrusted. They are cleaned with `ammonia` against an
//! allow-list before being emitted unescaped into a page.

use ammonia::Builder;
use regex::Regex;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::utils::normalize_whitespace;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// Tags allowed in rendered content
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "p", "div", "span", "b", "i", "u", "strong", "em", "ul", "ol", "li", "h1", "h2", "h3", "h4",
    "h5", "h6", "br", "a", "img", "table", "tr", "td", "th", "tbody", "thead", "tfoot",
];

/// Attributes allowed on any allowed tag
pub const DEFAULT_ALLOWED_ATTRIBUTES: &[&str] = &["href", "src", "alt", "class", "style"];

/// Tags whose content is dropped together with the tag
const CLEAN_CONTENT_TAGS: &[&str] = &["script", "style"];

/// Allow-list HTML cleaner
///
/// Tags outside the allow-list are unwrapped: the tag goes, its children
/// stay. `script` and `style` are removed with their content and can never
/// be allowed. Event handler attributes are never kept, and URLs with a
/// non-web scheme such as `javascript:` are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlSanitizer {
    tags: HashSet<String>,
    attributes: HashSet<String>,
}

impl HtmlSanitizer {
    pub fn new<T, A>(allowed_tags: T, allowed_attributes: A) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let tags = allowed_tags
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .filter(|t| !CLEAN_CONTENT_TAGS.contains(&t.as_str()))
            .collect();

        let attributes = allowed_attributes
            .into_iter()
            .map(|a| a.into().to_ascii_lowercase())
            .filter(|a| !a.starts_with("on"))
            .collect();

        Self { tags, attributes }
    }

    /// Clean an HTML fragment
    ///
    /// Never fails: malformed markup is parsed leniently and whatever
    /// survives the allow-list is serialized back.
    pub fn sanitize(&self, html: &str) -> String {
        if !has_content(html) {
            return String::new();
        }

        let tags: HashSet<&str> = self.tags.iter().map(String::as_str).collect();
        let attributes: HashSet<&str> = self.attributes.iter().map(String::as_str).collect();
        let allows_rel = attributes.contains("rel");

        let mut builder = Builder::default();
        builder
            .tags(tags)
            .tag_attributes(HashMap::new())
            .generic_attributes(attributes)
            .attribute_filter(filter_attribute);

        // ammonia refuses to manage rel itself when it is allow-listed
        if allows_rel {
            builder.link_rel(None);
        }

        builder.clean(html).to_string()
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_TAGS.iter().copied(),
            DEFAULT_ALLOWED_ATTRIBUTES.iter().copied(),
        )
    }
}

/// Drop inline styles that can smuggle script
fn filter_attribute<'u>(_element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if attribute == "style" {
        let lowered = value.to_ascii_lowercase();
        if lowered.contains("javascript:") || lowered.contains("expression(") {
            return None;
        }
    }
    Some(Cow::Borrowed(value))
}

/// Remove all HTML tags from text
///
/// Regex based; only meant for deriving plain text such as alt attributes
/// from markup that is sanitized separately.
///
/// # Examples
///
/// ```
/// use kosen_web::content::sanitize::strip_html_tags;
///
/// assert_eq!(strip_html_tags("<p>Сайн <b>уу</b></p>"), "Сайн уу");
/// ```
pub fn strip_html_tags(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").to_string()
}

/// Plain-text rendition of an HTML fragment, on a single line
///
/// Tags are stripped, then every named and numeric entity is decoded.
pub fn plain_text(html: &str) -> String {
    let stripped = strip_html_tags(html);
    normalize_whitespace(&html_escape::decode_html_entities(&stripped))
}

/// Check if text contains anything besides whitespace
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed_with_content() {
        let clean = HtmlSanitizer::default().sanitize("<p>hi</p><script>alert(1)</script>");
        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn test_event_handlers_removed() {
        let clean = HtmlSanitizer::default().sanitize(r#"<p onclick="steal()">hi</p>"#);
        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn test_javascript_url_removed() {
        let clean =
            HtmlSanitizer::default().sanitize(r#"<a href="javascript:alert(1)">link</a>"#);
        assert!(!clean.contains("javascript"));
        assert!(clean.contains("link"));
    }

    #[test]
    fn test_unknown_tag_unwrapped() {
        let clean = HtmlSanitizer::default().sanitize("<section><p>kept</p></section>");
        assert_eq!(clean, "<p>kept</p>");

        let clean = HtmlSanitizer::default().sanitize("<blink>text</blink>");
        assert_eq!(clean, "text");
    }

    #[test]
    fn test_style_tag_removed() {
        let clean = HtmlSanitizer::default().sanitize("<style>p { color: red }</style><p>x</p>");
        assert_eq!(clean, "<p>x</p>");
    }

    #[test]
    fn test_allowed_attributes_kept() {
        let html = r#"<img src="http://h/media/a.png" alt="a"><span class="lead" style="color:red">x</span>"#;
        let clean = HtmlSanitizer::default().sanitize(html);
        assert!(clean.contains(r#"src="http://h/media/a.png""#));
        assert!(clean.contains(r#"alt="a""#));
        assert!(clean.contains(r#"class="lead""#));
        assert!(clean.contains(r#"style="color:red""#));
    }

    #[test]
    fn test_disallowed_attribute_dropped() {
        let clean = HtmlSanitizer::default().sanitize(r#"<p id="x" data-foo="y">t</p>"#);
        assert_eq!(clean, "<p>t</p>");
    }

    #[test]
    fn test_script_in_style_attribute_dropped() {
        let clean = HtmlSanitizer::default()
            .sanitize(r#"<span style="background:url(javascript:alert(1))">x</span>"#);
        assert_eq!(clean, "<span>x</span>");
    }

    #[test]
    fn test_script_can_never_be_allowed() {
        let sanitizer = HtmlSanitizer::new(["p", "script"], ["onclick"]);
        assert_eq!(sanitizer.sanitize("<script>x</script><p>y</p>"), "<p>y</p>");
        assert_eq!(sanitizer.sanitize(r#"<p onclick="x()">y</p>"#), "<p>y</p>");
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let sanitizer = HtmlSanitizer::default();
        let _ = sanitizer.sanitize("<p><b>unclosed <i>tags");
        let _ = sanitizer.sanitize("<<<>>>");
        assert_eq!(sanitizer.sanitize(""), "");
        assert_eq!(sanitizer.sanitize("   "), "");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<p>Сайн&nbsp;уу</p>\n<p>дэлхий</p>"), "Сайн уу дэлхий");
        assert_eq!(plain_text(""), "");
    }

    #[test]
    fn test_plain_text_decodes_named_and_numeric_entities() {
        assert_eq!(
            plain_text("<p>&laquo;Элсэлт&raquo; 2025 &#1052;&#x41D; &hellip;</p>"),
            "«Элсэлт» 2025 МН …"
        );
        assert_eq!(plain_text("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
    }

    #[test]
    fn test_has_content() {
        assert!(has_content("x"));
        assert!(!has_content(" \n\t"));
    }
}

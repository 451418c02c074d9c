//! Render plan assembly
//!
//! Turns a content item into a flat, render-ready plan: merged blocks,
//! sanitized HTML with media references rewritten, resolved image sources
//! and an optional banner. Templates only iterate over the result.

use chrono::DateTime;
use serde::Serialize;

use super::blocks::{block_key, extract_banner, merge_blocks, BlockKind, OrderedBlock};
use super::media::MediaBase;
use super::sanitize::{has_content, plain_text, HtmlSanitizer};
use crate::config::MediaConfig;
use crate::models::{Content, ContentSummary, ImageBlock, Tag};
use crate::utils::truncate_text;

/// Image shown when a content card or detail image is missing
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/images/koocen.png";

/// Image shown when a carousel slide has no image
pub const DEFAULT_BANNER_IMAGE: &str = "/images/banner.jpg";

const CARD_DESCRIPTION_LIMIT: usize = 160;

/// Options for one call site of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Pull the last image out as a banner
    pub with_banner: bool,
    /// Source used for images without a path; empty means "not available"
    pub fallback_image: String,
}

impl AssembleOptions {
    /// Content detail: banner on, placeholder for missing images
    pub fn detail(fallback_image: impl Into<String>) -> Self {
        Self {
            with_banner: true,
            fallback_image: fallback_image.into(),
        }
    }

    /// Page section: no banner, missing images stay unavailable
    pub fn section() -> Self {
        Self {
            with_banner: false,
            fallback_image: String::new(),
        }
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            with_banner: false,
            fallback_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextUnit {
    pub id: i64,
    pub key: String,
    /// Sanitized HTML, safe to emit unescaped
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUnit {
    pub id: i64,
    pub key: String,
    /// Resolved source, empty when unavailable and no fallback was given
    pub src: String,
    /// Sanitized caption HTML
    pub caption_html: String,
    pub alt: String,
    /// Whether the block carried its own image path
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderUnit {
    Text(TextUnit),
    Image(ImageUnit),
}

impl RenderUnit {
    pub fn key(&self) -> &str {
        match self {
            Self::Text(unit) => &unit.key,
            Self::Image(unit) => &unit.key,
        }
    }
}

/// Render-ready form of one content item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderPlan {
    pub banner: Option<ImageUnit>,
    pub units: Vec<RenderUnit>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.banner.is_none() && self.units.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.units.iter().map(RenderUnit::key).collect()
    }
}

/// Assemble a render plan for a content item
///
/// Never fails. Missing collections produce an empty plan, missing image
/// paths fall back to `options.fallback_image`.
pub fn assemble(
    content: &Content,
    media: &MediaBase,
    sanitizer: &HtmlSanitizer,
    options: &AssembleOptions,
) -> RenderPlan {
    let merged = merge_blocks(&content.texts, &content.images);
    let (banner, blocks) = if options.with_banner {
        extract_banner(merged)
    } else {
        (None, merged)
    };

    let render_html = |html: &str| sanitizer.sanitize(&media.rewrite(html));

    let image_unit = |image: &ImageBlock| {
        let caption_html = render_html(&image.caption);
        let alt = if has_content(&image.caption) {
            plain_text(&image.caption)
        } else {
            content.title.clone()
        };

        ImageUnit {
            id: image.id,
            key: block_key(BlockKind::Image, image.id),
            src: media.resolve(image.url(), &options.fallback_image),
            caption_html,
            alt,
            available: image.url().is_some(),
        }
    };

    let units = blocks
        .iter()
        .map(|block| match block {
            OrderedBlock::Text(text) => RenderUnit::Text(TextUnit {
                id: text.id,
                key: block.key(),
                html: render_html(&text.raw_html),
            }),
            OrderedBlock::Image(image) => RenderUnit::Image(image_unit(image)),
        })
        .collect();

    RenderPlan {
        banner: banner.as_ref().map(image_unit),
        units,
    }
}

/// List preview of a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentCard {
    pub id: i64,
    pub href: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub created_at: String,
    pub tag: Option<Tag>,
}

/// Pipeline configured once and shared by every call site
#[derive(Debug, Clone)]
pub struct ContentPipeline {
    media: MediaBase,
    sanitizer: HtmlSanitizer,
    placeholder_image: String,
    banner_image: String,
}

impl ContentPipeline {
    pub fn new(media: MediaBase, sanitizer: HtmlSanitizer) -> Self {
        Self {
            media,
            sanitizer,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            banner_image: DEFAULT_BANNER_IMAGE.to_string(),
        }
    }

    /// Pipeline for the configured media host and placeholder images
    pub fn from_config(media: &MediaConfig) -> Self {
        Self::new(MediaBase::new(&media.base_url), HtmlSanitizer::default())
            .with_placeholders(&media.placeholder_image, &media.banner_image)
    }

    pub fn with_placeholders(
        mut self,
        placeholder_image: impl Into<String>,
        banner_image: impl Into<String>,
    ) -> Self {
        self.placeholder_image = placeholder_image.into();
        self.banner_image = banner_image.into();
        self
    }

    pub fn media(&self) -> &MediaBase {
        &self.media
    }

    pub fn placeholder_image(&self) -> &str {
        &self.placeholder_image
    }

    pub fn banner_image(&self) -> &str {
        &self.banner_image
    }

    pub fn assemble(&self, content: &Content, options: &AssembleOptions) -> RenderPlan {
        assemble(content, &self.media, &self.sanitizer, options)
    }

    /// Plan for the content detail page
    pub fn detail(&self, content: &Content) -> RenderPlan {
        self.assemble(content, &AssembleOptions::detail(&self.placeholder_image))
    }

    /// Plan for a content shown as a section of a static page
    pub fn section(&self, content: &Content) -> RenderPlan {
        self.assemble(content, &AssembleOptions::section())
    }

    /// Rewrite and sanitize a standalone HTML fragment
    pub fn render_html(&self, html: &str) -> String {
        self.sanitizer.sanitize(&self.media.rewrite(html))
    }

    /// Card for content listings
    pub fn card(&self, summary: &ContentSummary) -> ContentCard {
        let raw_image = summary.image.as_ref().and_then(ImageBlock::url);

        ContentCard {
            id: summary.id,
            href: format!("/content/{}", summary.id),
            title: summary.title.clone(),
            description: truncate_text(&plain_text(&summary.description), CARD_DESCRIPTION_LIMIT),
            image: self.media.resolve(raw_image, &self.placeholder_image),
            created_at: format_date(&summary.created_at),
            tag: summary.tags.first().cloned(),
        }
    }
}

impl Default for ContentPipeline {
    fn default() -> Self {
        Self::new(MediaBase::default(), HtmlSanitizer::default())
    }
}

/// Format an API timestamp as `YYYY-MM-DD`, keeping unparsable input as is
pub fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

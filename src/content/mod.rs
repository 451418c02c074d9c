//! Content block pipeline
//!
//! Shared by the content detail page, static page sections and content
//! list previews:
//!
//! ```text
//! texts[] + images[] -> merge_blocks -> [extract_banner] -> rewrite + sanitize
//!                                                       -> resolve images -> RenderPlan
//! ```
//!
//! Everything in here is synchronous and side-effect free.

pub mod assemble;
pub mod blocks;
pub mod media;
pub mod sanitize;

pub use assemble::{
    assemble, AssembleOptions, ContentCard, ContentPipeline, ImageUnit, RenderPlan, RenderUnit,
    TextUnit, DEFAULT_BANNER_IMAGE, DEFAULT_PLACEHOLDER_IMAGE,
};
pub use blocks::{extract_banner, merge_blocks, BlockKind, OrderedBlock};
pub use media::{rewrite_media_urls, MediaBase, DEFAULT_MEDIA_URL};
pub use sanitize::HtmlSanitizer;

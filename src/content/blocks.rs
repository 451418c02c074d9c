//! Ordered block sequence
//!
//! A content item stores its text and image fragments in two separate
//! collections, each carrying its own `order`. Rendering needs a single
//! sequence, so the two are merged here.

use serde::Serialize;

use crate::models::{ImageBlock, TextBlock};

/// Which collection a block came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// One entry of the merged sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderedBlock {
    Text(TextBlock),
    Image(ImageBlock),
}

impl OrderedBlock {
    pub fn order(&self) -> i64 {
        match self {
            Self::Text(block) => block.order,
            Self::Image(block) => block.order,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Text(block) => block.id,
            Self::Image(block) => block.id,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text(_) => BlockKind::Text,
            Self::Image(_) => BlockKind::Image,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    /// Key that stays stable across re-renders of the same content
    ///
    /// Ids are only unique within one variant, so the kind is part of the key.
    pub fn key(&self) -> String {
        block_key(self.kind(), self.id())
    }
}

/// Build the `{kind}-{id}` key used for rendered units
pub fn block_key(kind: BlockKind, id: i64) -> String {
    format!("{}-{}", kind.as_str(), id)
}

/// Merge text and image blocks into one sequence ordered by `order`
///
/// Texts are placed before images and the sort is stable, so on equal
/// `order` a text block precedes an image block and blocks of the same
/// kind keep their input order. The result always holds
/// `texts.len() + images.len()` blocks.
pub fn merge_blocks(texts: &[TextBlock], images: &[ImageBlock]) -> Vec<OrderedBlock> {
    let mut blocks: Vec<OrderedBlock> = Vec::with_capacity(texts.len() + images.len());
    blocks.extend(texts.iter().cloned().map(OrderedBlock::Text));
    blocks.extend(images.iter().cloned().map(OrderedBlock::Image));

    // slice::sort_by_key is stable
    blocks.sort_by_key(OrderedBlock::order);
    blocks
}

/// Pull the banner image out of a merged sequence
///
/// The banner is the last image block by position. It is removed from the
/// sequence; every other block keeps its relative order. Without any image
/// the input is returned untouched.
pub fn extract_banner(blocks: Vec<OrderedBlock>) -> (Option<ImageBlock>, Vec<OrderedBlock>) {
    let Some(index) = blocks.iter().rposition(OrderedBlock::is_image) else {
        return (None, blocks);
    };

    let mut banner = None;
    let mut remaining = Vec::with_capacity(blocks.len().saturating_sub(1));

    for (position, block) in blocks.into_iter().enumerate() {
        match block {
            OrderedBlock::Image(image) if position == index => banner = Some(image),
            other => remaining.push(other),
        }
    }

    (banner, remaining)
}

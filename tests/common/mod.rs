//! Common test utilities

#![allow(dead_code)]

use kosen_web::models::{Content, ImageBlock, PageNode, TextBlock};

/// Text block with the given id and order
pub fn text(id: i64, order: i64, html: &str) -> TextBlock {
    TextBlock {
        id,
        order,
        raw_html: html.to_string(),
    }
}

/// Image block pointing at an uploaded file
pub fn image(id: i64, order: i64, path: &str) -> ImageBlock {
    ImageBlock {
        id,
        order,
        image: Some(path.to_string()),
        ..Default::default()
    }
}

/// Content with the given blocks and default metadata
pub fn content(texts: Vec<TextBlock>, images: Vec<ImageBlock>) -> Content {
    Content {
        id: 5,
        title: "Элсэлт 2025".to_string(),
        texts,
        images,
        ..Default::default()
    }
}

/// Navigation node with children
pub fn node(id: &str, title: &str, slug: &str, children: Vec<PageNode>) -> PageNode {
    PageNode {
        id: id.to_string(),
        title: title.to_string(),
        slug: slug.to_string(),
        children,
    }
}

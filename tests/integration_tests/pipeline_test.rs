//! Content pipeline integration tests
//!
//! Properties of the shared pipeline and the two reference scenarios:
//! mixed texts and images with a banner, and an empty content item.

use kosen_web::content::{
    assemble, extract_banner, merge_blocks, rewrite_media_urls, AssembleOptions, HtmlSanitizer,
    MediaBase, OrderedBlock, RenderUnit,
};
use kosen_web::models::{Content, ImageBlock, TextBlock};
use proptest::prelude::*;

use crate::common::{content, image, text};

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_texts_and_images_with_banner() {
    let content = content(
        vec![text(1, 2, "<p>A</p>")],
        vec![image(9, 1, "/media/a.png"), image(10, 5, "/media/b.png")],
    );

    let merged = merge_blocks(&content.texts, &content.images);
    let keys: Vec<String> = merged.iter().map(OrderedBlock::key).collect();
    assert_eq!(keys, vec!["image-9", "text-1", "image-10"]);

    let plan = assemble(
        &content,
        &MediaBase::new("http://cdn"),
        &HtmlSanitizer::default(),
        &AssembleOptions::detail("/images/koocen.png"),
    );

    let banner = plan.banner.as_ref().expect("banner");
    assert_eq!(banner.id, 10);
    assert_eq!(banner.src, "http://cdn/media/b.png");
    assert_eq!(plan.keys(), vec!["image-9", "text-1"]);

    match &plan.units[0] {
        RenderUnit::Image(unit) => assert_eq!(unit.src, "http://cdn/media/a.png"),
        other => panic!("expected image, got {other:?}"),
    }
    match &plan.units[1] {
        RenderUnit::Text(unit) => assert_eq!(unit.html, "<p>A</p>"),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn test_empty_content() {
    let content = Content::default();

    let merged = merge_blocks(&content.texts, &content.images);
    assert!(merged.is_empty());

    let (banner, remaining) = extract_banner(merged);
    assert!(banner.is_none());
    assert!(remaining.is_empty());

    let plan = assemble(
        &content,
        &MediaBase::new("http://cdn"),
        &HtmlSanitizer::default(),
        &AssembleOptions::detail("/images/koocen.png"),
    );
    assert!(plan.is_empty());
}

#[test]
fn test_banner_without_images_keeps_blocks() {
    let merged = merge_blocks(&[text(1, 1, "<p>a</p>"), text(2, 2, "<p>b</p>")], &[]);
    let (banner, remaining) = extract_banner(merged.clone());

    assert!(banner.is_none());
    assert_eq!(remaining, merged);
}

#[test]
fn test_resolve_examples() {
    let media = MediaBase::new("http://h");
    assert_eq!(media.resolve(None, "/images/koocen.png"), "/images/koocen.png");
    assert_eq!(media.resolve(Some("/media/x.png"), "fb"), "http://h/media/x.png");
    assert_eq!(
        media.resolve(Some("http://other/x.png"), "fb"),
        "http://other/x.png"
    );
}

#[test]
fn test_section_marks_missing_images_unavailable() {
    let content = content(
        vec![],
        vec![ImageBlock {
            id: 3,
            order: 1,
            ..Default::default()
        }],
    );

    let plan = assemble(
        &content,
        &MediaBase::new("http://h"),
        &HtmlSanitizer::default(),
        &AssembleOptions::section(),
    );

    assert!(plan.banner.is_none());
    match &plan.units[0] {
        RenderUnit::Image(unit) => {
            assert!(!unit.available);
            assert_eq!(unit.src, "");
        }
        other => panic!("expected image, got {other:?}"),
    }
}

// ============================================================================
// Properties
// ============================================================================

fn texts_strategy() -> impl Strategy<Value = Vec<TextBlock>> {
    prop::collection::vec(-3i64..4, 0..8).prop_map(|orders| {
        orders
            .into_iter()
            .enumerate()
            .map(|(i, order)| text(i as i64, order, "<p>t</p>"))
            .collect()
    })
}

fn images_strategy() -> impl Strategy<Value = Vec<ImageBlock>> {
    prop::collection::vec(-3i64..4, 0..8).prop_map(|orders| {
        orders
            .into_iter()
            .enumerate()
            .map(|(i, order)| image(100 + i as i64, order, "/media/i.png"))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_merge_keeps_every_block_in_order(texts in texts_strategy(), images in images_strategy()) {
        let merged = merge_blocks(&texts, &images);
        prop_assert_eq!(merged.len(), texts.len() + images.len());

        for pair in merged.windows(2) {
            prop_assert!(pair[0].order() <= pair[1].order());
            if pair[0].order() == pair[1].order() {
                // Texts come first on equal order
                prop_assert!(!(pair[0].is_image() && !pair[1].is_image()));
            }
        }

        let mut expected_texts = texts.clone();
        expected_texts.sort_by_key(|t| t.order);
        let merged_texts: Vec<i64> = merged.iter().filter(|b| !b.is_image()).map(OrderedBlock::id).collect();
        prop_assert_eq!(merged_texts, expected_texts.iter().map(|t| t.id).collect::<Vec<_>>());

        let mut expected_images = images.clone();
        expected_images.sort_by_key(|i| i.order);
        let merged_images: Vec<i64> = merged.iter().filter(|b| b.is_image()).map(OrderedBlock::id).collect();
        prop_assert_eq!(merged_images, expected_images.iter().map(|i| i.id).collect::<Vec<_>>());
    }

    #[test]
    fn prop_banner_is_last_image(texts in texts_strategy(), images in images_strategy()) {
        let merged = merge_blocks(&texts, &images);
        let last_image = merged.iter().rev().find(|b| b.is_image()).map(OrderedBlock::id);

        let (banner, remaining) = extract_banner(merged.clone());
        match last_image {
            Some(id) => {
                prop_assert_eq!(banner.map(|b| b.id), Some(id));
                prop_assert_eq!(remaining.len(), merged.len() - 1);
            }
            None => {
                prop_assert!(banner.is_none());
                prop_assert_eq!(remaining, merged);
            }
        }
    }

    #[test]
    fn prop_rewrite_is_idempotent(
        html in r#"[a-z <>="'/.]{0,30}(src="/media/[a-z]{1,6}\.png")?[a-z <>/]{0,10}"#,
        base in "https?://[a-z]{1,8}(\\.[a-z]{2,3})?/?",
    ) {
        let once = rewrite_media_urls(&html, &base);
        let twice = rewrite_media_urls(&once, &base);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_sanitize_strips_scripts(
        prefix in "[a-zA-Z <>/p]{0,20}",
        body in "[a-zA-Z0-9();. ]{0,20}",
        suffix in "[a-zA-Z <>/p]{0,20}",
    ) {
        let html = format!("{prefix}<script>{body}</script>{suffix}");
        let clean = HtmlSanitizer::default().sanitize(&html);
        prop_assert!(!clean.to_lowercase().contains("<script"));
    }
}

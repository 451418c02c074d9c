//! Static page navigation tree
//!
//! The backend returns the page hierarchy as nested [`PageNode`] roots.
//! Pages are addressed by slug in URLs, so lookups walk the tree
//! depth-first to find the node (and its ancestors) for a slug.

use serde::Serialize;

use crate::models::PageNode;
use crate::utils::encode_path_segment;

/// Header menu depth
pub const MAX_NAV_DEPTH: usize = 3;

/// Header menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    pub active: bool,
    pub children: Vec<NavItem>,
}

/// Breadcrumb trail entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub href: String,
}

/// Owned navigation tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageTree {
    roots: Vec<PageNode>,
}

impl PageTree {
    pub fn new(roots: Vec<PageNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PageNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes at any depth
    pub fn len(&self) -> usize {
        fn count(nodes: &[PageNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }

    /// First node with `slug` in depth-first pre-order
    pub fn find_by_slug(&self, slug: &str) -> Option<&PageNode> {
        find_in(&self.roots, slug)
    }

    /// Path from a root down to the node with `slug`, both included
    pub fn path_to(&self, slug: &str) -> Option<Vec<&PageNode>> {
        let mut trail = Vec::new();
        path_in(&self.roots, slug, &mut trail).then_some(trail)
    }

    /// Breadcrumb trail for a page, empty when the slug is unknown
    pub fn breadcrumbs(&self, slug: &str) -> Vec<Breadcrumb> {
        self.path_to(slug)
            .unwrap_or_default()
            .into_iter()
            .map(|node| Breadcrumb {
                label: node.title.clone(),
                href: page_href(&node.slug),
            })
            .collect()
    }

    /// Header menu, limited to [`MAX_NAV_DEPTH`] levels
    ///
    /// Items on the path to `active_slug` are flagged active.
    pub fn nav_items(&self, active_slug: Option<&str>) -> Vec<NavItem> {
        let active: Vec<&str> = active_slug
            .and_then(|slug| self.path_to(slug))
            .map(|path| path.iter().map(|n| n.slug.as_str()).collect())
            .unwrap_or_default();

        build_items(&self.roots, &active, MAX_NAV_DEPTH)
    }
}

/// URL of a static page
pub fn page_href(slug: &str) -> String {
    format!("/page/{}", encode_path_segment(slug))
}

/// URL of the content listing for a tag
pub fn tag_href(slug: &str) -> String {
    format!("/contents/{}", encode_path_segment(slug))
}

/// Home page with the news carousel switched to a tag
pub fn home_tag_href(slug: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("tag", slug)
        .finish();
    format!("/?{query}")
}

fn find_in<'a>(nodes: &'a [PageNode], slug: &str) -> Option<&'a PageNode> {
    for node in nodes {
        if node.slug == slug {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, slug) {
            return Some(found);
        }
    }
    None
}

fn path_in<'a>(nodes: &'a [PageNode], slug: &str, trail: &mut Vec<&'a PageNode>) -> bool {
    for node in nodes {
        trail.push(node);
        if node.slug == slug || path_in(&node.children, slug, trail) {
            return true;
        }
        trail.pop();
    }
    false
}

fn build_items(nodes: &[PageNode], active: &[&str], depth: usize) -> Vec<NavItem> {
    if depth == 0 {
        return Vec::new();
    }

    nodes
        .iter()
        .map(|node| NavItem {
            label: node.title.clone(),
            href: page_href(&node.slug),
            active: active.contains(&node.slug.as_str()),
            children: build_items(&node.children, active, depth - 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(slug: &str, children: Vec<PageNode>) -> PageNode {
        PageNode {
            id: format!("id-{slug}"),
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            children,
        }
    }

    fn tree() -> PageTree {
        PageTree::new(vec![
            node(
                "about",
                vec![node("history", vec![node("founders", vec![node("deep", vec![])])])],
            ),
            node("admission", vec![node("programs", vec![])]),
        ])
    }

    #[test]
    fn test_find_by_slug_nested() {
        let tree = tree();
        assert_eq!(tree.find_by_slug("founders").map(|n| n.id.as_str()), Some("id-founders"));
        assert_eq!(tree.find_by_slug("programs").map(|n| n.id.as_str()), Some("id-programs"));
        assert!(tree.find_by_slug("missing").is_none());
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = tree().breadcrumbs("founders");
        let hrefs: Vec<&str> = crumbs.iter().map(|c| c.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/page/about", "/page/history", "/page/founders"]);
        assert!(tree().breadcrumbs("missing").is_empty());
    }

    #[test]
    fn test_nav_items_depth_limit() {
        let items = tree().nav_items(None);
        assert_eq!(items.len(), 2);

        let founders = &items[0].children[0].children[0];
        assert_eq!(founders.href, "/page/founders");
        assert!(founders.children.is_empty(), "fourth level must be cut");
    }

    #[test]
    fn test_nav_items_active_path() {
        let items = tree().nav_items(Some("history"));
        assert!(items[0].active);
        assert!(items[0].children[0].active);
        assert!(!items[1].active);
    }

    #[test]
    fn test_len() {
        assert_eq!(tree().len(), 6);
        assert!(PageTree::default().is_empty());
    }
}

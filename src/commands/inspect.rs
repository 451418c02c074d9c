//! Offline inspection of what the site would render

use anyhow::{Context, Result};
use std::path::Path;

use kosen_web::client::{ApiClient, ContentApi};
use kosen_web::config::Config;
use kosen_web::content::ContentPipeline;
use kosen_web::models::PageNode;
use kosen_web::navigation::{page_href, PageTree};
use kosen_web::utils::parse_content_id;

/// Print the render plan of one content item as JSON
pub async fn render(config: Config, id: String, section: bool) -> Result<()> {
    config.validate()?;
    let id = parse_content_id(&id)?;
    let client = ApiClient::new(&config.api).context("Failed to create API client")?;

    let content = client
        .content(id)
        .await
        .with_context(|| format!("Failed to fetch content {id}"))?;

    let pipeline = ContentPipeline::from_config(&config.media);
    let plan = if section {
        pipeline.section(&content)
    } else {
        pipeline.detail(&content)
    };

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Print the static page tree
pub async fn nav(config: Config) -> Result<()> {
    config.validate()?;
    let client = ApiClient::new(&config.api).context("Failed to create API client")?;
    let tree = PageTree::new(
        client
            .navigation()
            .await
            .context("Failed to fetch page navigation")?,
    );

    if tree.is_empty() {
        println!("No pages published.");
        return Ok(());
    }

    println!("Page navigation ({} pages)", tree.len());
    println!("================================");
    print_nodes(tree.roots(), 0);
    Ok(())
}

fn print_nodes(nodes: &[PageNode], depth: usize) {
    for node in nodes {
        println!(
            "{}- {} ({})",
            "  ".repeat(depth),
            node.title,
            page_href(&node.slug)
        );
        print_nodes(&node.children, depth + 1);
    }
}

/// Validate a configuration and print the effective values
pub fn check_config(config: &Config, source: Option<&Path>) -> Result<()> {
    match source {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: environment"),
    }
    println!("================================");

    config.validate()?;

    println!("{}", toml::to_string_pretty(config)?);
    println!("Configuration is valid.");
    Ok(())
}

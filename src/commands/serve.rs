use anyhow::{Context, Result};

use kosen_web::config::Config;
use kosen_web::site::{shutdown_signal, SiteServer};

/// Run the site until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    println!("Starting {}", config.site.name);
    println!("========================");
    println!("  Address: http://{}", config.bind_address());
    println!("  Content API: {}", config.api.base_url);
    println!("  Media: {}", config.media.base_url);
    println!(
        "  Cache: {} (ttl {}s)",
        config.cache.redis_url.as_deref().unwrap_or("in-process"),
        config.cache.ttl_secs
    );
    println!("  Locale: {}", config.site.locale);
    println!();

    let server = SiteServer::new(config)
        .await
        .context("Failed to initialize site server")?;

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

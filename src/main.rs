use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kosen_web::config::Config;
use kosen_web::{i18n, metrics};

mod commands;

#[derive(Parser)]
#[command(
    name = "kosen-web",
    version,
    about = "Server-rendered KOOSEN college site backed by a remote content API",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site
    Serve {
        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the render plan of a content item
    Render {
        /// Content id
        id: String,

        /// Render as a page section (no banner extraction)
        #[arg(long, default_value = "false")]
        section: bool,
    },

    /// Print the static page navigation tree
    Nav,

    /// Validate the configuration and print it
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    i18n::set_locale(&config.site.locale);

    tracing::info!(locale = %i18n::current_locale(), "kosen-web starting");

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            metrics::init_metrics()?;
            tracing::info!(
                port = %config.server.port,
                api = %config.api.base_url,
                "Starting serve command"
            );
            commands::serve(config).await?;
        }

        Commands::Render { id, section } => {
            tracing::info!(id = %id, section = %section, "Starting render command");
            commands::render(config, id, section).await?;
        }

        Commands::Nav => {
            commands::nav(config).await?;
        }

        Commands::CheckConfig => {
            commands::check_config(&config, cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("kosen_web=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("kosen_web={level},tower_http={level},warn"))
        })
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod page;
mod site;
mod utils;
mod video;

use config::Config;
use page::PageDecorator;
use site::{SiteOptions, SiteRunner};
use video::{VideoCardEnricher, YouTubeDataApi};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built site directory or a single HTML page
    path: PathBuf,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Write the processed site here instead of rewriting pages in place
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Re-enrich cards that were already enriched by a previous run
    #[arg(long)]
    force: bool,

    /// Process pages and report, but write nothing
    #[arg(long)]
    dry_run: bool,
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/vidcards/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/vidcards/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = get_config_path(&args);
    let config = match &config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    info!("Starting vidcards...");

    match &config_path {
        Some(path) => info!("Loaded config from: {}", path),
        None => info!("No config file found, using defaults"),
    }

    let enricher = match config.resolve_api_key() {
        Some(api_key) => {
            let source = YouTubeDataApi::new(&config.youtube, api_key)?;
            Some(
                VideoCardEnricher::new(Box::new(source), config.cards.clone(), &config.youtube)
                    .with_force(args.force),
            )
        }
        None => {
            warn!(
                "No YouTube API key configured (set {} or youtube.api_key); video cards will not be enriched",
                config::API_KEY_ENV
            );
            None
        }
    };

    let decorator = PageDecorator::from_config(&config.pages);
    let options = SiteOptions {
        output: args.output.clone(),
        dry_run: args.dry_run,
    };

    let mut runner = SiteRunner::new(enricher, decorator, options);
    runner.run(&args.path).await?;

    Ok(())
}

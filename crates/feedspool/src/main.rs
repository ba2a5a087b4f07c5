//! feedspool - mirror RSS/Atom feeds into a local maildir.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use feedspool_core::{CacheRepository, Maildir, Synchronizer};
use feedspool_feed::HttpFetcher;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use render::{InlineHtmlDiff, TextRenderer};

/// Mirror RSS/Atom feeds into a local maildir.
#[derive(Debug, Parser)]
#[command(name = "feedspool", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the maildir path from the configuration.
    #[arg(long)]
    maildir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("feedspool={0},feedspool_core={0},feedspool_feed={0}", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let maildir_path = cli.maildir.unwrap_or_else(|| config.maildir_path());
    let cache_path = config.cache_path(&maildir_path);
    info!(
        config = %config_path.display(),
        maildir = %maildir_path.display(),
        feeds = config.feeds.len(),
        "starting feedspool"
    );

    let store = Maildir::open(&maildir_path)
        .with_context(|| format!("cannot open maildir {}", maildir_path.display()))?;
    let cache = CacheRepository::new(cache_path);
    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let renderer = TextRenderer;
    let differ = InlineHtmlDiff;

    let feeds = config
        .feeds
        .into_iter()
        .map(config::FeedEntry::into_feed_config)
        .collect::<Result<Vec<_>>>()?;

    let report = Synchronizer::new(&store, &cache, &fetcher, &renderer, &differ)
        .run(&feeds)
        .context("synchronization failed")?;

    info!(
        delivered = report.delivered,
        deleted = report.deleted,
        failed = report.failed,
        "done"
    );
    Ok(())
}

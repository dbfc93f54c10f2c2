//! # Feed Harvester
//!
//! Collects recent articles from a registry of organizational websites.
//!
//! For each source the harvester looks for an RSS/Atom feed (conventional
//! paths, then `<link rel="alternate">`), validates it and extracts entries.
//! Sites without a usable feed are scraped with layout heuristics. Articles
//! are then labelled with a category and region from a lookup table, sorted
//! and written as one JSON array.
//!
//! ## Modes
//!
//! - `run`: everything in one pass
//! - `discover` then `aggregate`: pick strategies first, label the sources by
//!   hand in the generated lookup template, then pull for real
//!
//! ## Logging
//!
//! Controlled with `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=feed_harvester=debug`.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod discovery;
mod enrich;
mod error;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod regions;
mod registry;
mod resolver;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use config::HarvestConfig;
use fetch::HttpFetcher;
use pipeline::Harvester;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_harvester starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => HarvestConfig::load(path)?,
        None => HarvestConfig::default(),
    };
    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let harvester = Harvester::new(fetcher, config);

    let result = match &args.command {
        Command::Run {
            registry,
            output,
            lookup,
        } => harvester.run(registry, output, lookup.as_deref()).await,
        Command::Discover {
            registry,
            state,
            lookup_template,
        } => harvester.discover(registry, state, lookup_template).await,
        Command::Aggregate {
            state,
            lookup,
            output,
        } => harvester.aggregate(state, lookup, output).await,
    };

    match result {
        Ok(summary) => {
            info!(
                articles = summary.articles,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "feed_harvester finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "feed_harvester failed");
            Err(e.into())
        }
    }
}

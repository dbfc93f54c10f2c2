//! Command-line interface definitions for Feed Harvester.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Run settings that are not paths live in the optional YAML config.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Feed Harvester application.
///
/// # Examples
///
/// ```sh
/// # Single pass: discover, pull and write in one go
/// feed_harvester run --registry sources.yaml --output articles.json
///
/// # Two stages with a hand-filled lookup table in between
/// feed_harvester discover --registry sources.yaml --state state.json --lookup-template lookup.yaml
/// feed_harvester aggregate --state state.json --lookup lookup.yaml --output articles.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resolve every source, enrich, sort and write the article collection
    Run {
        /// Source registry (YAML or JSON)
        #[arg(short, long)]
        registry: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Optional lookup table mapping root URLs to category and region
        #[arg(short, long)]
        lookup: Option<PathBuf>,
    },

    /// Pick a strategy per source and write a lookup template to fill in
    Discover {
        /// Source registry (YAML or JSON)
        #[arg(short, long)]
        registry: PathBuf,

        /// Discovery state file to write
        #[arg(short, long)]
        state: PathBuf,

        /// Lookup template to write (existing entries are kept)
        #[arg(short, long)]
        lookup_template: PathBuf,
    },

    /// Pull with the discovered strategies and write the article collection
    Aggregate {
        /// Discovery state file written by `discover`
        #[arg(short, long)]
        state: PathBuf,

        /// Completed lookup table
        #[arg(short, long)]
        lookup: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

//! Error types shared across the harvester.
//!
//! Only the failures that must abort a run live in [`HarvestError`]. Remote
//! failures ([`FetchError`](crate::fetch::FetchError),
//! [`FeedError`](crate::discovery::feed::FeedError)) are recovered inside the
//! component that hit them and never reach this level.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal, run-level failures.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("cannot read registry {path}: {source}")]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {path} is not valid: {reason}")]
    RegistryInvalid { path: PathBuf, reason: String },

    #[error("registry {0} contains no sources")]
    RegistryEmpty(PathBuf),

    #[error("cannot load lookup table {path}: {reason}")]
    Lookup { path: PathBuf, reason: String },

    #[error("lookup table is missing category/region for {} source(s): {}", .0.len(), .0.join(", "))]
    LookupIncomplete(Vec<String>),

    #[error("cannot load discovery state {path}: {reason}")]
    State { path: PathBuf, reason: String },

    #[error("cannot load config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },
}

//! Input files: the source registry and persisted discovery state.
//!
//! The registry is an ordered list of sources in YAML or JSON (chosen by file
//! extension). Each entry is either a bare URL or a full descriptor:
//!
//! ```yaml
//! - https://www.osagenation-nsn.gov/
//! - root_url: https://navajotimes.com/
//!   label: Navajo Times
//!   tribe: Navajo Nation
//!   state: AZ
//! ```
//!
//! Everything here runs before any network activity, so a corrupt registry
//! aborts the run without a single request being made.

use crate::error::HarvestError;
use crate::models::{ResolvedSource, SourceDescriptor};
use crate::utils::is_http_url;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryEntry {
    Url(String),
    Source(SourceDescriptor),
}

impl From<RegistryEntry> for SourceDescriptor {
    fn from(entry: RegistryEntry) -> Self {
        match entry {
            RegistryEntry::Url(url) => SourceDescriptor::new(url),
            RegistryEntry::Source(source) => source,
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read and validate the registry at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_registry(path: &Path) -> Result<Vec<SourceDescriptor>, HarvestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| HarvestError::RegistryRead {
        path: path.to_path_buf(),
        source,
    })?;
    let sources = parse_registry(&raw, path)?;
    info!(count = sources.len(), "Loaded registry");
    Ok(sources)
}

/// Parse registry text. `path` selects the format and is used in errors.
pub fn parse_registry(raw: &str, path: &Path) -> Result<Vec<SourceDescriptor>, HarvestError> {
    let invalid = |reason: String| HarvestError::RegistryInvalid {
        path: path.to_path_buf(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(HarvestError::RegistryEmpty(path.to_path_buf()));
    }
    let entries: Option<Vec<RegistryEntry>> = if is_json(path) {
        serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?
    } else {
        serde_yaml::from_str(raw).map_err(|e| invalid(e.to_string()))?
    };
    let sources: Vec<SourceDescriptor> = entries
        .unwrap_or_default()
        .into_iter()
        .map(SourceDescriptor::from)
        .map(|mut s| {
            s.root_url = s.root_url.trim().to_string();
            s
        })
        .collect();

    if sources.is_empty() {
        return Err(HarvestError::RegistryEmpty(path.to_path_buf()));
    }
    if let Some((index, bad)) = sources
        .iter()
        .enumerate()
        .find(|(_, s)| !is_http_url(&s.root_url))
    {
        return Err(invalid(format!(
            "entry {index} has an empty or non-http root_url {:?}",
            bad.root_url
        )));
    }
    Ok(sources)
}

/// Read the discovery state written by the `discover` stage.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_state(path: &Path) -> Result<Vec<ResolvedSource>, HarvestError> {
    let state_error = |reason: String| HarvestError::State {
        path: path.to_path_buf(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| state_error(e.to_string()))?;
    let resolved: Vec<ResolvedSource> =
        serde_json::from_str(&raw).map_err(|e| state_error(e.to_string()))?;
    info!(count = resolved.len(), "Loaded discovery state");
    Ok(resolved)
}

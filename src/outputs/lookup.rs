//! Lookup template written by `discover`.
//!
//! The template lists every source that produced content, keyed by root URL,
//! with the category and region to be filled in by hand before `aggregate`.
//! Labels already present in an existing template are carried over.

use super::write_atomic;
use crate::enrich::LookupTable;
use crate::error::HarvestError;
use crate::models::{LookupEntry, ResolvedSource, Strategy};
use std::path::Path;
use tracing::{info, instrument};

/// Add an empty entry for each content-yielding source not yet in `table`.
pub fn merge_template(mut table: LookupTable, resolved: &[ResolvedSource]) -> LookupTable {
    for source in resolved.iter().filter(|r| r.strategy != Strategy::None) {
        if table.get(&source.source.root_url).is_none() {
            table.insert(source.source.root_url.clone(), LookupEntry::default());
        }
    }
    table
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), entries = table.len()))]
pub async fn write_template(path: &Path, table: &LookupTable) -> Result<(), HarvestError> {
    let yaml = serde_yaml::to_string(&table.to_sorted()).map_err(|e| HarvestError::Serialize {
        what: "lookup template",
        reason: e.to_string(),
    })?;
    write_atomic(path, yaml.as_bytes()).await?;
    info!("Wrote lookup template");
    Ok(())
}

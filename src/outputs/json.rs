//! JSON output: the article collection and the persisted discovery state.
//!
//! Articles are written as a single pretty-printed array using the field
//! names of [`ArticleRecord`]. The discovery state is the list of
//! [`ResolvedSource`] read back by `aggregate`.

use super::write_atomic;
use crate::error::HarvestError;
use crate::models::{ArticleRecord, ResolvedSource};
use std::path::Path;
use tracing::{info, instrument};

#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_articles(path: &Path, articles: &[ArticleRecord]) -> Result<(), HarvestError> {
    let json = serde_json::to_string_pretty(articles).map_err(|e| HarvestError::Serialize {
        what: "articles",
        reason: e.to_string(),
    })?;
    write_atomic(path, json.as_bytes()).await?;
    info!("Wrote article collection");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), count = resolved.len()))]
pub async fn write_state(path: &Path, resolved: &[ResolvedSource]) -> Result<(), HarvestError> {
    let json = serde_json::to_string_pretty(resolved).map_err(|e| HarvestError::Serialize {
        what: "discovery state",
        reason: e.to_string(),
    })?;
    write_atomic(path, json.as_bytes()).await?;
    info!("Wrote discovery state");
    Ok(())
}

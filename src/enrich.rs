//! Category/region enrichment.
//!
//! Articles are matched to the lookup table by the registry root URL they were
//! harvested from. A miss, or an empty label, becomes [`UNKNOWN`]; no article
//! is ever dropped here.

use crate::error::HarvestError;
use crate::models::{ArticleRecord, LookupEntry, ResolvedSource, SourceDescriptor, Strategy, UNKNOWN};
use crate::regions::region_for_state;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Root URL → category and region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    entries: HashMap<String, LookupEntry>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML (or JSON) map of root URL to `{category, region}`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let lookup_error = |reason: String| HarvestError::Lookup {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| lookup_error(e.to_string()))?;
        let entries: Option<HashMap<String, LookupEntry>> = if raw.trim().is_empty() {
            None
        } else {
            serde_yaml::from_str(&raw).map_err(|e| lookup_error(e.to_string()))?
        };
        let table = Self {
            entries: entries.unwrap_or_default(),
        };
        info!(entries = table.len(), "Loaded lookup table");
        Ok(table)
    }

    pub fn insert(&mut self, root_url: impl Into<String>, entry: LookupEntry) {
        self.entries.insert(root_url.into(), entry);
    }

    pub fn get(&self, root_url: &str) -> Option<&LookupEntry> {
        self.entries.get(root_url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill blanks from registry hints.
    ///
    /// Labels already present in the table win. A source without a region
    /// hint falls back to the region of its state code.
    pub fn with_registry_hints(mut self, sources: &[SourceDescriptor]) -> Self {
        for source in sources {
            let category = source.category_hint.as_deref().map(str::trim).unwrap_or_default();
            let region = source
                .region_hint
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .or_else(|| source.state.as_deref().and_then(region_for_state))
                .unwrap_or_default();
            if category.is_empty() && region.is_empty() {
                continue;
            }
            let entry = self.entries.entry(source.root_url.clone()).or_default();
            if entry.category.trim().is_empty() {
                entry.category = category.to_string();
            }
            if entry.region.trim().is_empty() {
                entry.region = region.to_string();
            }
        }
        self
    }

    /// Root URLs of content-yielding sources that lack a category or region.
    pub fn missing_for(&self, resolved: &[ResolvedSource]) -> Vec<String> {
        resolved
            .iter()
            .filter(|r| r.strategy != Strategy::None)
            .map(|r| &r.source.root_url)
            .filter(|url| !self.get(url).is_some_and(LookupEntry::is_complete))
            .cloned()
            .collect()
    }

    /// Entries sorted by root URL, for writing templates.
    pub fn to_sorted(&self) -> BTreeMap<String, LookupEntry> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn label_or_unknown(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Attach category and region to every article.
///
/// # Arguments
///
/// * `articles` - Merged records from every source
/// * `lookup` - Labels keyed by registry root URL
///
/// # Returns
///
/// The same records in the same order. A root URL with no entry, or an entry
/// with a blank label, gets `unknown`. Running it twice gives the same result.
#[instrument(level = "info", skip_all, fields(articles = articles.len()))]
pub fn enrich(articles: Vec<ArticleRecord>, lookup: &LookupTable) -> Vec<ArticleRecord> {
    let mut misses = 0usize;
    let enriched: Vec<ArticleRecord> = articles
        .into_iter()
        .map(|mut article| {
            let entry = lookup.get(&article.root_url);
            if entry.is_none() {
                misses += 1;
            }
            article.category = label_or_unknown(entry.map(|e| e.category.as_str()));
            article.region = label_or_unknown(entry.map(|e| e.region.as_str()));
            article
        })
        .collect();
    if misses > 0 {
        debug!(misses, "Articles without a lookup entry");
    }
    enriched
}

//! End-to-end harvest runs.
//!
//! Three entry points share one [`Harvester`]:
//!
//! - [`Harvester::run`]: resolve every source, enrich, normalize, write.
//! - [`Harvester::discover`]: resolve every source with sample-sized pulls,
//!   persist the outcome and write a lookup template for manual labelling.
//! - [`Harvester::aggregate`]: reuse persisted strategies with a complete
//!   lookup table and write the final collection.
//!
//! Inputs are validated and the output location is checked before the first
//! request, so configuration mistakes fail fast.

use crate::config::HarvestConfig;
use crate::enrich::{LookupTable, enrich};
use crate::error::HarvestError;
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, ResolvedSource, SourceDescriptor, Strategy};
use crate::normalize::normalize;
use crate::outputs::{json, lookup};
use crate::registry::{load_registry, load_state};
use crate::resolver::{PullLimits, Resolution, SourceResolver};
use crate::scrapers::HeuristicScraper;
use crate::utils::ensure_writable_parent;
use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Per-strategy counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: usize,
    pub feed: usize,
    pub scrape: usize,
    pub none: usize,
    pub articles: usize,
}

impl RunSummary {
    fn from_resolved<'a>(resolved: impl IntoIterator<Item = &'a ResolvedSource>, articles: usize) -> Self {
        let mut summary = RunSummary {
            articles,
            ..Default::default()
        };
        for r in resolved {
            summary.sources += 1;
            match r.strategy {
                Strategy::Feed => summary.feed += 1,
                Strategy::Scrape => summary.scrape += 1,
                Strategy::None => summary.none += 1,
            }
        }
        summary
    }

    fn log(&self, stage: &str) {
        info!(
            stage,
            sources = self.sources,
            feed = self.feed,
            scrape = self.scrape,
            none = self.none,
            articles = self.articles,
            "Harvest finished"
        );
    }
}

/// Owns the fetcher, configuration and scraper for a run.
pub struct Harvester<F> {
    fetcher: F,
    config: HarvestConfig,
    scraper: HeuristicScraper,
}

impl<F: Fetcher> Harvester<F> {
    pub fn new(fetcher: F, config: HarvestConfig) -> Self {
        Self {
            fetcher,
            config,
            scraper: HeuristicScraper::default(),
        }
    }

    fn resolver(&self) -> SourceResolver<'_, F> {
        SourceResolver::new(&self.fetcher, &self.config, &self.scraper)
    }

    /// Fixed inter-source delay plus up to 250 ms of jitter. A zero delay
    /// disables both.
    async fn politeness_delay(&self) {
        let base = self.config.inter_source_delay();
        if base.is_zero() {
            return;
        }
        let jitter_ms: u64 = rng().random_range(0..=250);
        let delay = base + Duration::from_millis(jitter_ms);
        debug!(delay_ms = delay.as_millis() as u64, "Pausing before next source");
        sleep(delay).await;
    }

    /// Resolve every source, keeping registry order.
    #[instrument(level = "info", skip_all, fields(sources = sources.len(), workers = self.config.worker_count()))]
    pub async fn resolve_all(&self, sources: &[SourceDescriptor], limits: PullLimits) -> Vec<Resolution> {
        let resolver = self.resolver();
        let resolver = &resolver;
        let last = sources.len().saturating_sub(1);
        stream::iter(sources.iter().enumerate())
            .map(|(i, source)| async move {
                info!(index = i, source = %source.display_name(), "Resolving source");
                let resolution = resolver.resolve(source, limits).await;
                if i < last {
                    self.politeness_delay().await;
                }
                resolution
            })
            .buffered(self.config.worker_count())
            .collect()
            .await
    }

    /// Pull every previously resolved source, keeping state order.
    #[instrument(level = "info", skip_all, fields(sources = resolved.len()))]
    pub async fn pull_all(&self, resolved: &[ResolvedSource], limits: PullLimits) -> Vec<Resolution> {
        let resolver = self.resolver();
        let resolver = &resolver;
        let last = resolved.len().saturating_sub(1);
        stream::iter(resolved.iter().enumerate())
            .map(|(i, source)| async move {
                let pulled = resolver.pull(source, limits).await;
                if i < last && source.strategy != Strategy::None {
                    self.politeness_delay().await;
                }
                pulled
            })
            .buffered(self.config.worker_count())
            .collect()
            .await
    }

    /// Single-pass harvest: resolve every source, enrich, normalize, write.
    ///
    /// # Arguments
    ///
    /// * `registry` - YAML or JSON list of sources
    /// * `output` - Destination of the article JSON array
    /// * `lookup_path` - Optional lookup table; registry hints fill its gaps
    ///
    /// # Returns
    ///
    /// Per-strategy counts, or a [`HarvestError`] when the registry, lookup
    /// file or output location is unusable. Those are checked before the first
    /// request. Individual sources never fail the run.
    #[instrument(level = "info", skip_all, fields(registry = %registry.display(), output = %output.display()))]
    pub async fn run(
        &self,
        registry: &Path,
        output: &Path,
        lookup_path: Option<&Path>,
    ) -> Result<RunSummary, HarvestError> {
        let sources = load_registry(registry)?;
        let table = match lookup_path {
            Some(p) => LookupTable::load(p)?,
            None => LookupTable::new(),
        }
        .with_registry_hints(&sources);
        if table.is_empty() {
            info!("No lookup labels available; every article will be unknown");
        }
        ensure_writable_parent(output).await?;

        let resolutions = self
            .resolve_all(&sources, PullLimits::full(&self.config))
            .await;
        let resolved: Vec<ResolvedSource> = resolutions.iter().map(|r| r.resolved.clone()).collect();
        let merged: Vec<ArticleRecord> = resolutions
            .into_iter()
            .flat_map(|r| r.articles)
            .collect();

        let articles = normalize(enrich(merged, &table), self.config.max_per_source);
        json::write_articles(output, &articles).await?;

        let summary = RunSummary::from_resolved(&resolved, articles.len());
        summary.log("run");
        Ok(summary)
    }

    /// Stage 1: pick strategies and prepare the lookup template.
    #[instrument(level = "info", skip_all, fields(registry = %registry.display(), state = %state_path.display()))]
    pub async fn discover(
        &self,
        registry: &Path,
        state_path: &Path,
        template_path: &Path,
    ) -> Result<RunSummary, HarvestError> {
        let sources = load_registry(registry)?;
        let existing = if template_path.exists() {
            LookupTable::load(template_path)?
        } else {
            LookupTable::new()
        };
        ensure_writable_parent(state_path).await?;
        ensure_writable_parent(template_path).await?;

        let resolutions = self
            .resolve_all(&sources, PullLimits::sample(&self.config))
            .await;
        let resolved: Vec<ResolvedSource> = resolutions.iter().map(|r| r.resolved.clone()).collect();
        let sampled: usize = resolutions.iter().map(|r| r.articles.len()).sum();

        json::write_state(state_path, &resolved).await?;
        let template = lookup::merge_template(existing.with_registry_hints(&sources), &resolved);
        lookup::write_template(template_path, &template).await?;

        let pending = template.missing_for(&resolved);
        if !pending.is_empty() {
            info!(
                count = pending.len(),
                template = %template_path.display(),
                "Fill in category and region before aggregating"
            );
        }

        let summary = RunSummary::from_resolved(&resolved, sampled);
        summary.log("discover");
        Ok(summary)
    }

    /// Stage 2: pull with persisted strategies and a complete lookup table.
    #[instrument(level = "info", skip_all, fields(state = %state_path.display(), output = %output.display()))]
    pub async fn aggregate(
        &self,
        state_path: &Path,
        lookup_path: &Path,
        output: &Path,
    ) -> Result<RunSummary, HarvestError> {
        let resolved = load_state(state_path)?;
        let sources: Vec<SourceDescriptor> = resolved.iter().map(|r| r.source.clone()).collect();
        let table = LookupTable::load(lookup_path)?.with_registry_hints(&sources);

        let missing = table.missing_for(&resolved);
        if !missing.is_empty() {
            return Err(HarvestError::LookupIncomplete(missing));
        }
        ensure_writable_parent(output).await?;

        let pulled = self
            .pull_all(&resolved, PullLimits::full(&self.config))
            .await;
        let used: Vec<ResolvedSource> = pulled.iter().map(|p| p.resolved.clone()).collect();
        let merged: Vec<ArticleRecord> = pulled.into_iter().flat_map(|p| p.articles).collect();
        let articles = normalize(enrich(merged, &table), self.config.max_per_source);
        json::write_articles(output, &articles).await?;

        let summary = RunSummary::from_resolved(&used, articles.len());
        summary.log("aggregate");
        Ok(summary)
    }
}

//! Run configuration.
//!
//! Everything the pipeline needs that is not part of the registry itself:
//! probe paths, timeouts, extraction bounds and politeness settings. The
//! whole struct is built once at startup and passed down by reference; no
//! component keeps process-wide state.
//!
//! All fields have defaults, so a config file only needs to name what it
//! overrides:
//!
//! ```yaml
//! summary_max_chars: 300
//! inter_source_delay_ms: 500
//! workers: 4
//! ```

use crate::error::HarvestError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Identifying user agent sent with every request. Many origins reject empty
/// or library-default agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Conventional feed locations, probed in order against the root URL.
pub const DEFAULT_FEED_PATHS: &[&str] = &[
    "/feed/",
    "/rss/",
    "/rss.xml",
    "/blog/feed/",
    "/blog/rss/",
    "/news/feed/",
    "/atom.xml",
    "/wp-json/wp/v2/posts?_embed&feed=rss2",
    "/feed/rss/",
    "/feed/atom/",
    "/category/news/feed/",
];

/// Section names probed when news-section discovery is enabled.
pub const DEFAULT_NEWS_SECTION_PATHS: &[&str] = &[
    "news",
    "press-releases",
    "media",
    "announcements",
    "updates",
    "blog",
    "newsroom",
    "currents",
    "publications",
    "news-media",
];

/// Request timeouts, in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Timeouts {
    /// HEAD probes of conventional feed paths.
    pub probe_ms: u64,
    /// GET of the root page while looking for an alternate link.
    pub page_ms: u64,
    /// GET confirming an advertised alternate feed.
    pub confirm_ms: u64,
    /// HEAD probes of news-section paths.
    pub section_ms: u64,
    /// GET of a feed document (validation and extraction).
    pub feed_ms: u64,
    /// GET of a page to scrape.
    pub scrape_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe_ms: 3_000,
            page_ms: 7_000,
            confirm_ms: 5_000,
            section_ms: 5_000,
            feed_ms: 20_000,
            scrape_ms: 15_000,
        }
    }
}

impl Timeouts {
    pub fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }
    pub fn page(&self) -> Duration {
        Duration::from_millis(self.page_ms)
    }
    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }
    pub fn section(&self) -> Duration {
        Duration::from_millis(self.section_ms)
    }
    pub fn feed(&self) -> Duration {
        Duration::from_millis(self.feed_ms)
    }
    pub fn scrape(&self) -> Duration {
        Duration::from_millis(self.scrape_ms)
    }
}

/// Thresholds used by the heuristic scraper.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScrapeSettings {
    /// A container's title must be longer than this many characters.
    pub min_container_title_chars: usize,
    /// A broad-scan link's visible text must be longer than this many characters.
    pub min_link_text_chars: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            min_container_title_chars: 15,
            min_link_text_chars: 20,
        }
    }
}

/// Summary length bound and the marker appended when it is exceeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBound {
    pub max_chars: usize,
    pub marker: String,
}

/// Complete configuration for one harvest run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HarvestConfig {
    pub user_agent: String,
    pub timeouts: Timeouts,
    pub feed_paths: Vec<String>,
    pub news_section_paths: Vec<String>,
    /// Scrape a discovered news section instead of the root page.
    pub discover_news_section: bool,
    pub max_feed_entries: usize,
    pub max_scraped_articles: usize,
    /// Feed entries pulled per source during `discover`.
    pub sample_feed_entries: usize,
    /// Scraped articles pulled per source during `discover`.
    pub sample_scraped_articles: usize,
    pub summary_max_chars: usize,
    pub truncation_marker: String,
    pub scrape: ScrapeSettings,
    /// Pause after each source.
    pub inter_source_delay_ms: u64,
    /// Number of sources resolved at once. `1` keeps the run strictly sequential.
    pub workers: usize,
    /// Keep at most this many records per source URL in the final output.
    pub max_per_source: Option<usize>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeouts: Timeouts::default(),
            feed_paths: DEFAULT_FEED_PATHS.iter().map(|s| s.to_string()).collect(),
            news_section_paths: DEFAULT_NEWS_SECTION_PATHS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            discover_news_section: false,
            max_feed_entries: 10,
            max_scraped_articles: 5,
            sample_feed_entries: 5,
            sample_scraped_articles: 3,
            summary_max_chars: 500,
            truncation_marker: "...".to_string(),
            scrape: ScrapeSettings::default(),
            inter_source_delay_ms: 1_500,
            workers: 1,
            max_per_source: None,
        }
    }
}

impl HarvestConfig {
    /// Load a YAML config file, falling back to defaults for absent fields.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let raw = std::fs::read_to_string(path).map_err(|e| HarvestError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: HarvestConfig =
            serde_yaml::from_str(&raw).map_err(|e| HarvestError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!(workers = config.workers, "Loaded configuration");
        Ok(config)
    }

    pub fn summary_bound(&self) -> SummaryBound {
        SummaryBound {
            max_chars: self.summary_max_chars,
            marker: self.truncation_marker.clone(),
        }
    }

    pub fn inter_source_delay(&self) -> Duration {
        Duration::from_millis(self.inter_source_delay_ms)
    }

    /// Worker count, never below one.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

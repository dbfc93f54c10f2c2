//! Feed entries to article records.
//!
//! The extractor reads at most `max_entries` entries, in feed order, and maps
//! each to an [`ArticleRecord`]. Missing fields become placeholders or the
//! `No Date` sentinel; nothing in an individual entry can fail the call.

use crate::config::{HarvestConfig, SummaryBound};
use crate::discovery::feed::{FeedEntry, ParsedFeed, parse_feed};
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, NO_LINK, NO_TITLE, Published, Strategy, UNKNOWN};
use crate::utils::{clean_summary, resolve_link, strip_html};
use tracing::{info, instrument, warn};
use url::Url;

/// Fetch `feed_url` and convert its first `max_entries` entries.
///
/// # Arguments
///
/// * `fetcher` - HTTP boundary used for the single `GET`
/// * `config` - Feed timeout and summary bound
/// * `feed_url` - A validated feed URL; relative entry links resolve against it
/// * `max_entries` - Upper bound on records, taken from the top of the feed
///
/// # Returns
///
/// Records in feed order with `pull_method` set to `feed`. Category, region
/// and root URL are left for later stages. Any fetch or parse failure yields
/// an empty list.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn extract<F: Fetcher>(
    fetcher: &F,
    config: &HarvestConfig,
    feed_url: &str,
    max_entries: usize,
) -> Vec<ArticleRecord> {
    let page = match fetcher.get(feed_url, config.timeouts.feed()).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed during extraction");
            return Vec::new();
        }
    };
    let feed = match parse_feed(&page.body) {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, "Feed parse failed during extraction");
            return Vec::new();
        }
    };
    let records = records_from_feed(&feed, feed_url, max_entries, &config.summary_bound());
    info!(count = records.len(), "Extracted feed entries");
    records
}

/// Convert the first `max_entries` entries of an already parsed feed.
pub fn records_from_feed(
    feed: &ParsedFeed,
    feed_url: &str,
    max_entries: usize,
    bound: &SummaryBound,
) -> Vec<ArticleRecord> {
    let base = Url::parse(feed_url).ok();
    feed.entries
        .iter()
        .take(max_entries)
        .map(|entry| record_from_entry(entry, feed_url, base.as_ref(), bound))
        .collect()
}

fn record_from_entry(
    entry: &FeedEntry,
    feed_url: &str,
    base: Option<&Url>,
    bound: &SummaryBound,
) -> ArticleRecord {
    let title = entry
        .title
        .as_deref()
        .map(strip_html)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let link = match entry.link.as_deref() {
        Some(href) => base
            .and_then(|b| resolve_link(b, href))
            .unwrap_or_else(|| href.to_string()),
        None => NO_LINK.to_string(),
    };

    let published = match (entry.published, entry.raw_date.as_deref()) {
        (Some(dt), _) => Published::At(dt),
        (None, Some(raw)) => Published::Raw(raw.trim().to_string()),
        (None, None) => Published::NoDate,
    };

    let summary = entry
        .summary
        .as_deref()
        .or(entry.content.as_deref())
        .map(|raw| clean_summary(raw, bound))
        .unwrap_or_default();

    ArticleRecord {
        title,
        link,
        published,
        summary,
        source_url: feed_url.to_string(),
        category: UNKNOWN.to_string(),
        region: UNKNOWN.to_string(),
        root_url: String::new(),
        pull_method: Strategy::Feed,
    }
}

//! Feed validation.
//!
//! A candidate is usable only if it parses without a structural error *and*
//! has at least one entry. A well-formed but empty feed is rejected so the
//! resolver moves on to scraping instead of settling for nothing.

use crate::config::HarvestConfig;
use crate::discovery::feed::parse_feed;
use crate::fetch::Fetcher;
use crate::utils::truncate_for_log;
use tracing::{debug, instrument};

/// Decide whether `candidate` is a usable feed.
///
/// # Arguments
///
/// * `fetcher` - HTTP boundary used for the single `GET`
/// * `config` - Supplies the feed timeout
/// * `candidate` - URL returned by the locator
///
/// # Returns
///
/// `true` only when the body parses as a feed and has at least one entry.
/// Fetch errors, parse errors and empty feeds are all `false`.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn validate<F: Fetcher>(fetcher: &F, config: &HarvestConfig, candidate: &str) -> bool {
    let page = match fetcher.get(candidate, config.timeouts.feed()).await {
        Ok(page) => page,
        Err(e) => {
            debug!(error = %e, "Feed fetch failed");
            return false;
        }
    };
    match parse_feed(&page.body) {
        Ok(feed) if feed.entries.is_empty() => {
            debug!("Feed parsed but has no entries");
            false
        }
        Ok(feed) => {
            debug!(
                entries = feed.entries.len(),
                title = feed.title.as_deref().unwrap_or_default(),
                "Feed is valid"
            );
            true
        }
        Err(e) => {
            debug!(
                error = %e,
                body_preview = %truncate_for_log(&page.body, 200),
                "Feed is malformed"
            );
            false
        }
    }
}

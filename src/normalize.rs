//! Final ordering of the output collection.
//!
//! Records are sorted newest-first within category and region, all three keys
//! descending. Anything without a real timestamp sorts as the oldest. The sort
//! is stable, so ties keep registry order.

use crate::models::ArticleRecord;
use chrono::NaiveDateTime;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, instrument};

type SortKey = (String, String, Option<NaiveDateTime>);

fn sort_key(article: &ArticleRecord) -> SortKey {
    (
        article.category.to_lowercase(),
        article.region.to_lowercase(),
        article.published.instant(),
    )
}

/// Sort `articles` for output.
///
/// Order is descending on `(category, region, published)`, with labels
/// compared case-insensitively. Date sentinels and raw date text sort below
/// every parsed timestamp. The sort is stable, so ties keep merge order.
///
/// # Arguments
///
/// * `articles` - Enriched records
/// * `max_per_source` - When set, keep only the first N records of each
///   `source_url` in sorted order
///
/// # Returns
///
/// The sorted (and possibly capped) records.
#[instrument(level = "info", skip(articles), fields(articles = articles.len()))]
pub fn normalize(
    mut articles: Vec<ArticleRecord>,
    max_per_source: Option<usize>,
) -> Vec<ArticleRecord> {
    articles.sort_by_cached_key(|a| Reverse(sort_key(a)));

    let Some(limit) = max_per_source else {
        return articles;
    };
    let before = articles.len();
    let mut seen: HashMap<String, usize> = HashMap::new();
    articles.retain(|a| {
        let count = seen.entry(a.source_url.clone()).or_insert(0);
        *count += 1;
        *count <= limit
    });
    debug!(dropped = before - articles.len(), limit, "Applied per-source limit");
    articles
}

//! Text, URL and file system helpers.
//!
//! This module provides helper functions used throughout the application:
//! - HTML stripping and whitespace normalization for titles and summaries
//! - Summary truncation with a configurable marker
//! - Relative link resolution against a base URL
//! - String truncation for log fields
//! - File system validation for output directories

use crate::config::SummaryBound;
use crate::error::HarvestError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace into single spaces and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Reduce an HTML fragment to its plain text.
///
/// Entities are decoded, tags dropped and whitespace collapsed. Text nodes are
/// joined without a separator, so `<b>Hel</b>lo` becomes `Hello`.
pub fn strip_html(fragment: &str) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    collapse_whitespace(&text)
}

/// Bound a summary to `bound.max_chars` characters.
///
/// Longer input is cut to exactly `max_chars` characters and the marker is
/// appended; shorter input is returned unchanged.
pub fn truncate_summary(text: &str, bound: &SummaryBound) -> String {
    if text.chars().count() <= bound.max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(bound.max_chars).collect();
    out.push_str(&bound.marker);
    out
}

/// Strip HTML and bound the result in one step.
pub fn clean_summary(raw: &str, bound: &SummaryBound) -> String {
    truncate_summary(&strip_html(raw), bound)
}

/// Resolve `href` against `base`. Absolute hrefs come back unchanged.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}

/// `true` for absolute `http`/`https` URLs.
pub fn is_http_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped characters appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, count - max)
    }
}

/// Ensure the parent directory of `file` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
/// Called before any network activity so a bad output path fails the run
/// immediately instead of after every source has been fetched.
#[instrument(level = "info", skip_all, fields(file = %file.display()))]
pub async fn ensure_writable_parent(file: &Path) -> Result<(), HarvestError> {
    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let output_error = |source: std::io::Error| HarvestError::Output {
        path: dir.clone(),
        source,
    };
    fs::create_dir_all(&dir).await.map_err(output_error)?;
    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path).map_err(output_error)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}

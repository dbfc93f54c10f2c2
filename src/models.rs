//! Data models for sources, discovery outcomes and harvested articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceDescriptor`]: one registry entry (a root URL plus optional hints)
//! - [`ResolvedSource`]: a descriptor plus the strategy that produced content
//! - [`ArticleRecord`]: one normalized article, whichever strategy produced it
//! - [`Published`]: a normalized timestamp or an explicit "no date" sentinel
//!
//! The serialized field names of [`ArticleRecord`] are consumed by downstream
//! tooling and must not change. The category is written as `tribe`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical timestamp format for `published`.
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Sentinel for feed entries that carry no date at all.
pub const NO_DATE: &str = "No Date";
/// Sentinel for scraped articles.
pub const SCRAPED_NO_DATE: &str = "Date N/A (Scraped)";
/// Placeholder for entries without a title.
pub const NO_TITLE: &str = "No Title";
/// Placeholder for entries without a link.
pub const NO_LINK: &str = "No Link";
/// Category/region value when the lookup table has nothing for a source.
pub const UNKNOWN: &str = "unknown";

/// One content origin from the registry.
///
/// Constructed once at startup and never mutated during a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceDescriptor {
    /// Canonical entry URL.
    pub root_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, alias = "tribe", skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_hint: Option<String>,
    /// Two-letter state code, used to derive a region when none is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl SourceDescriptor {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            label: None,
            category_hint: None,
            region_hint: None,
            state: None,
        }
    }

    /// Name used in log lines: the label if present, else the root URL.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.root_url)
    }
}

/// How content was obtained for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Feed,
    Scrape,
    None,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Feed => "feed",
            Strategy::Scrape => "scrape",
            Strategy::None => "none",
        };
        f.write_str(s)
    }
}

/// A source together with the outcome of discovery.
///
/// `strategy == Strategy::None` always comes with `article_count == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedSource {
    pub source: SourceDescriptor,
    pub strategy: Strategy,
    /// Feed URL for `Feed`, otherwise the page that was scraped (or attempted).
    pub effective_url: String,
    #[serde(default)]
    pub article_count: usize,
}

/// Publication time of an article.
///
/// Serialized as a plain string: the canonical `YYYY-MM-DD HH:MM:SS` form, the
/// raw date text from the feed, or one of the sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Published {
    At(NaiveDateTime),
    Raw(String),
    NoDate,
    Scraped,
}

impl Published {
    /// Sort key. Anything that is not a real timestamp is the minimum.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            Published::At(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<String> for Published {
    fn from(s: String) -> Self {
        match s.as_str() {
            NO_DATE => Published::NoDate,
            SCRAPED_NO_DATE => Published::Scraped,
            _ => match NaiveDateTime::parse_from_str(&s, PUBLISHED_FORMAT) {
                Ok(dt) => Published::At(dt),
                Err(_) => Published::Raw(s),
            },
        }
    }
}

impl From<Published> for String {
    fn from(p: Published) -> Self {
        p.to_string()
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::At(dt) => write!(f, "{}", dt.format(PUBLISHED_FORMAT)),
            Published::Raw(s) => f.write_str(s),
            Published::NoDate => f.write_str(NO_DATE),
            Published::Scraped => f.write_str(SCRAPED_NO_DATE),
        }
    }
}

/// One normalized article.
///
/// Created by the feed extractor or the heuristic scraper with category and
/// region set to [`UNKNOWN`]; enrichment fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    pub published: Published,
    pub summary: String,
    /// Effective URL of the source that produced this record.
    pub source_url: String,
    #[serde(rename = "tribe")]
    pub category: String,
    pub region: String,
    /// Registry root URL this record traces back to.
    #[serde(rename = "source_root_url")]
    pub root_url: String,
    pub pull_method: Strategy,
}

/// Category and region for one root URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LookupEntry {
    #[serde(default, alias = "tribe")]
    pub category: String,
    #[serde(default)]
    pub region: String,
}

impl LookupEntry {
    /// Both labels present.
    pub fn is_complete(&self) -> bool {
        !self.category.trim().is_empty() && !self.region.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: "Council approves budget".to_string(),
            link: "https://example.org/news/budget".to_string(),
            published: Published::At(
                NaiveDate::from_ymd_opt(2025, 5, 6)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap(),
            ),
            summary: "Summary here".to_string(),
            source_url: "https://example.org/feed/".to_string(),
            category: "Osage".to_string(),
            region: "Oklahoma/Southern Plains".to_string(),
            root_url: "https://example.org/".to_string(),
            pull_method: Strategy::Feed,
        }
    }

    #[test]
    fn test_article_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["title"], "Council approves budget");
        assert_eq!(json["link"], "https://example.org/news/budget");
        assert_eq!(json["published"], "2025-05-06 14:30:00");
        assert_eq!(json["summary"], "Summary here");
        assert_eq!(json["source_url"], "https://example.org/feed/");
        assert_eq!(json["tribe"], "Osage");
        assert_eq!(json["region"], "Oklahoma/Southern Plains");
        assert_eq!(json["source_root_url"], "https://example.org/");
        assert_eq!(json["pull_method"], "feed");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_article_deserialization() {
        let json = serde_json::to_string(&record()).unwrap();
        let back: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record());
    }

    #[test]
    fn test_published_sentinels() {
        assert_eq!(Published::from(NO_DATE.to_string()), Published::NoDate);
        assert_eq!(
            Published::from(SCRAPED_NO_DATE.to_string()),
            Published::Scraped
        );
        assert_eq!(Published::NoDate.to_string(), "No Date");
        assert_eq!(Published::Scraped.to_string(), "Date N/A (Scraped)");
    }

    #[test]
    fn test_published_raw_text_is_kept() {
        let p = Published::from("Spring 2024".to_string());
        assert_eq!(p, Published::Raw("Spring 2024".to_string()));
        assert_eq!(p.instant(), None);
        assert_eq!(p.to_string(), "Spring 2024");
    }

    #[test]
    fn test_published_instant_orders_sentinels_first() {
        let dated = Published::from("2024-01-01 00:00:00".to_string());
        assert!(dated.instant().is_some());
        assert!(Published::NoDate.instant() < dated.instant());
        assert!(Published::Scraped.instant() < dated.instant());
    }

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(serde_json::to_string(&Strategy::Scrape).unwrap(), "\"scrape\"");
        let s: Strategy = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(s, Strategy::None);
        assert_eq!(Strategy::Feed.to_string(), "feed");
    }

    #[test]
    fn test_source_descriptor_minimal_yaml() {
        let sources: Vec<SourceDescriptor> =
            serde_yaml::from_str("- root_url: https://osagenews.org/\n").unwrap();
        assert_eq!(sources[0].root_url, "https://osagenews.org/");
        assert_eq!(sources[0].label, None);
        assert_eq!(sources[0].display_name(), "https://osagenews.org/");
    }

    #[test]
    fn test_lookup_entry_completeness() {
        let entry = LookupEntry {
            category: "Navajo Nation".to_string(),
            region: " ".to_string(),
        };
        assert!(!entry.is_complete());
        let entry: LookupEntry =
            serde_yaml::from_str("tribe: Navajo Nation\nregion: Southwest\n").unwrap();
        assert!(entry.is_complete());
        assert_eq!(entry.category, "Navajo Nation");
    }
}

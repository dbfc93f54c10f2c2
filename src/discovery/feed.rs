//! Syndication document parsing.
//!
//! RSS 0.9x/1.0/2.0, Atom and JSON Feed documents are parsed with `feed-rs`.
//! A parse error is the "bozo" condition that makes the validator reject a
//! candidate. Entry dates `feed-rs` cannot read are recovered as raw text by
//! a second, namespace-agnostic pass over the XML so the extractor can still
//! report them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use feed_rs::model::Entry;
use feed_rs::parser;
use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("unparseable feed: {0}")]
    Malformed(String),
}

/// The fields of one entry the extractor needs, with raw (unstripped) text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Published time, else updated time, as UTC.
    pub published: Option<NaiveDateTime>,
    /// Date text as written, kept only when it could not be parsed.
    pub raw_date: Option<String>,
    /// Atom `summary` or RSS `description`.
    pub summary: Option<String>,
    /// Atom `content` or RSS `content:encoded`.
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Parse a feed document.
///
/// # Arguments
///
/// * `xml` - The response body of a candidate feed URL.
///
/// # Returns
///
/// The feed title and its entries in document order, or
/// [`FeedError::Malformed`] when the document is not a readable feed (HTML
/// pages, broken XML, empty bodies).
pub fn parse_feed(xml: &str) -> Result<ParsedFeed, FeedError> {
    let feed = parser::parse(xml.as_bytes()).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let raw_dates = raw_entry_dates(xml);
    let aligned = raw_dates.len() == feed.entries.len();
    let entries = feed
        .entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let raw = if aligned { raw_dates[i].clone() } else { None };
            entry_fields(entry, raw)
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.content).and_then(non_blank),
        entries,
    })
}

fn non_blank(s: String) -> Option<String> {
    (!s.trim().is_empty()).then_some(s)
}

fn entry_fields(entry: Entry, raw_date: Option<String>) -> FeedEntry {
    let link = entry_link(&entry);
    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.naive_utc())
        .or_else(|| raw_date.as_deref().and_then(parse_feed_date));
    FeedEntry {
        title: entry.title.map(|t| t.content).and_then(non_blank),
        link,
        raw_date: if published.is_none() { raw_date } else { None },
        published,
        summary: entry.summary.map(|s| s.content).and_then(non_blank),
        content: entry.content.and_then(|c| c.body).and_then(non_blank),
    }
}

/// First alternate (or rel-less) link, then any link, then an http id.
fn entry_link(entry: &Entry) -> Option<String> {
    let usable = || entry.links.iter().filter(|l| !l.href.trim().is_empty());
    usable()
        .find(|l| {
            l.rel
                .as_deref()
                .is_none_or(|r| r.is_empty() || r.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| usable().next())
        .map(|l| l.href.trim().to_string())
        .or_else(|| {
            let id = entry.id.trim();
            (id.starts_with("http://") || id.starts_with("https://")).then(|| id.to_string())
        })
}

/// Parse a timestamp in any of the formats commonly found in feeds, as UTC.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }
    // Zulu suffix without seconds, e.g. 2025-05-06T14:30Z.
    if let Some(naive) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M") {
            return Some(dt);
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%a, %d %b %Y %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

const PUBLISHED_NAMES: &[&[u8]] = &[b"pubdate", b"published", b"date", b"issued"];
const UPDATED_NAMES: &[&[u8]] = &[b"updated", b"modified"];

#[derive(Default)]
struct DateSlots {
    published: Option<String>,
    updated: Option<String>,
}

/// Date text of every `item`/`entry` element in document order, matched by
/// local name so any namespace prefix works. Empty when the XML is broken.
fn raw_entry_dates(xml: &str) -> Vec<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut dates = Vec::new();
    let mut depth = 0usize;
    let mut entry: Option<(usize, DateSlots)> = None;
    let mut field: Option<(usize, bool, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let local = e.local_name().as_ref().to_ascii_lowercase();
                match entry.as_ref().map(|(d, _)| *d) {
                    None if local == b"item" || local == b"entry" => {
                        entry = Some((depth, DateSlots::default()));
                    }
                    Some(d) if depth == d + 1 => {
                        if PUBLISHED_NAMES.contains(&local.as_slice()) {
                            field = Some((depth, true, String::new()));
                        } else if UPDATED_NAMES.contains(&local.as_slice()) {
                            field = Some((depth, false, String::new()));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((_, _, text)) = field.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(_)) => {
                if field.as_ref().is_some_and(|(d, _, _)| *d == depth) {
                    if let (Some((_, is_published, text)), Some((_, slots))) =
                        (field.take(), entry.as_mut())
                    {
                        let text = non_blank(text.trim().to_string());
                        let slot = if is_published {
                            &mut slots.published
                        } else {
                            &mut slots.updated
                        };
                        if slot.is_none() {
                            *slot = text;
                        }
                    }
                }
                if entry.as_ref().is_some_and(|(d, _)| *d == depth) {
                    if let Some((_, slots)) = entry.take() {
                        dates.push(slots.published.or(slots.updated));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(_) => return Vec::new(),
            _ => {}
        }
    }
    dates
}

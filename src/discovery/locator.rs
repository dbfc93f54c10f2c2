//! Feed location for a site root.
//!
//! Candidates are tried in a fixed order and the first hit wins:
//!
//! 1. HEAD each conventional feed path; accept an XML content type.
//! 2. GET the root page and follow `<link rel="alternate">` pointing at an
//!    RSS or Atom document, confirmed with a second GET.
//! 3. Accept the root itself when it is served as a feed.
//!
//! Every request is guarded on its own. A failure only moves on to the next
//! candidate.

use crate::config::HarvestConfig;
use crate::fetch::{Fetcher, Page};
use crate::utils::resolve_link;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

static ALTERNATE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[href]").expect("static selector"));

const FEED_TYPES: &[&str] = &["application/rss+xml", "application/atom+xml"];

/// Find a candidate feed URL for `root_url`.
///
/// Three stages, first hit wins:
///
/// 1. `HEAD` every configured feed path under the root; an XML content type
///    accepts it.
/// 2. `GET` the root page and follow each `<link rel="alternate">` with an
///    RSS or Atom type, confirming it serves a feed.
/// 3. Accept the root itself when it already serves a feed.
///
/// # Arguments
///
/// * `fetcher` - HTTP boundary; every request carries its own timeout
/// * `config` - Feed paths and probe timeouts
/// * `root_url` - The source's registered root URL
///
/// # Returns
///
/// The absolute candidate URL, or `None` when every stage came up empty.
/// Network failures only advance to the next candidate.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn locate<F: Fetcher>(
    fetcher: &F,
    config: &HarvestConfig,
    root_url: &str,
) -> Option<String> {
    let base = match Url::parse(root_url) {
        Ok(u) => u,
        Err(e) => {
            debug!(error = %e, "Root URL does not parse");
            return None;
        }
    };

    for path in &config.feed_paths {
        let Some(candidate) = resolve_link(&base, path) else {
            continue;
        };
        match fetcher.head(&candidate, config.timeouts.probe()).await {
            Ok(probe) if probe.is_xml() => {
                info!(feed = %candidate, "Found feed at conventional path");
                return Some(candidate);
            }
            Ok(probe) => {
                debug!(%candidate, content_type = ?probe.content_type, "Probe is not XML")
            }
            Err(e) => debug!(%candidate, error = %e, "Probe failed"),
        }
    }

    let root = match fetcher.get(root_url, config.timeouts.page()).await {
        Ok(page) => page,
        Err(e) => {
            debug!(error = %e, "Root page fetch failed");
            return None;
        }
    };

    for href in alternate_feed_links(&root.body, &base) {
        match fetcher.get(&href, config.timeouts.confirm()).await {
            Ok(page) if page.is_xml() || page.looks_like_feed() => {
                info!(feed = %href, "Found feed via alternate link");
                return Some(href);
            }
            Ok(_) => debug!(%href, "Alternate link is not a feed"),
            Err(e) => debug!(%href, error = %e, "Alternate link fetch failed"),
        }
    }

    if root_is_feed(&root) {
        info!("Root page is itself a feed");
        return Some(root_url.to_string());
    }

    debug!("No feed candidate found");
    None
}

/// Absolute hrefs of `<link rel="alternate">` elements advertising a feed, in
/// document order.
pub fn alternate_feed_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ALTERNATE_LINK)
        .filter(|el| {
            let rel = el.value().attr("rel").unwrap_or_default();
            let kind = el.value().attr("type").unwrap_or_default().trim();
            rel.split_ascii_whitespace()
                .any(|r| r.eq_ignore_ascii_case("alternate"))
                && FEED_TYPES.iter().any(|t| kind.eq_ignore_ascii_case(t))
        })
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect()
}

fn root_is_feed(root: &Page) -> bool {
    root.is_xml() && root.looks_like_feed()
}

/// Find a news section under `root_url` to scrape instead of the root page.
///
/// Every configured section name is probed with a trailing slash first, then
/// every name again without one. The first success status wins.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn find_news_section<F: Fetcher>(
    fetcher: &F,
    config: &HarvestConfig,
    root_url: &str,
) -> Option<String> {
    let base = Url::parse(&format!("{}/", root_url.trim_end_matches('/'))).ok()?;
    let sections: Vec<&str> = config
        .news_section_paths
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect();
    let with_slash = sections.iter().map(|s| format!("{s}/"));
    let bare = sections.iter().map(|s| s.to_string());

    for rel in with_slash.chain(bare) {
        let Some(candidate) = resolve_link(&base, &rel) else {
            continue;
        };
        match fetcher.head(&candidate, config.timeouts.section()).await {
            Ok(_) => {
                info!(section = %candidate, "Found news section");
                return Some(candidate);
            }
            Err(e) => debug!(%candidate, error = %e, "Section probe failed"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::fetch::stub::StubFetcher;

    const ROOT: &str = "https://example.org/";

    fn config() -> HarvestConfig {
        HarvestConfig::default()
    }

    #[tokio::test]
    async fn test_conventional_path_wins_in_order() {
        let fetcher = StubFetcher::new()
            .head("https://example.org/feed/", "text/html")
            .head("https://example.org/rss/", "application/rss+xml")
            .head("https://example.org/rss.xml", "application/rss+xml");
        let found = locate(&fetcher, &config(), ROOT).await;
        assert_eq!(found.as_deref(), Some("https://example.org/rss/"));
        assert_eq!(
            fetcher.calls(),
            vec![
                "HEAD https://example.org/feed/".to_string(),
                "HEAD https://example.org/rss/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_probe_failures_advance() {
        let fetcher = StubFetcher::new()
            .fail("https://example.org/feed/", FetchError::Timeout)
            .head("https://example.org/atom.xml", "application/atom+xml; charset=utf-8");
        let found = locate(&fetcher, &config(), ROOT).await;
        assert_eq!(found.as_deref(), Some("https://example.org/atom.xml"));
    }

    #[tokio::test]
    async fn test_alternate_link_is_confirmed() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/style.css">
            <link rel="alternate" type="application/rss+xml" href="/syndication/news.xml">
            </head><body></body></html>"#;
        let fetcher = StubFetcher::new()
            .page(ROOT, "text/html", html)
            .page(
                "https://example.org/syndication/news.xml",
                "text/plain",
                "<rss version=\"2.0\"><channel></channel></rss>",
            );
        let found = locate(&fetcher, &config(), ROOT).await;
        assert_eq!(
            found.as_deref(),
            Some("https://example.org/syndication/news.xml")
        );
    }

    #[tokio::test]
    async fn test_unconfirmed_alternate_link_is_skipped() {
        let html = r#"<link rel="alternate" type="application/atom+xml" href="https://example.org/gone.xml">"#;
        let fetcher = StubFetcher::new().page(ROOT, "text/html", html);
        assert_eq!(locate(&fetcher, &config(), ROOT).await, None);
    }

    #[tokio::test]
    async fn test_root_served_as_feed() {
        let fetcher = StubFetcher::new().page(
            "https://feeds.example.org/",
            "application/xml",
            "<?xml version=\"1.0\"?><feed xmlns=\"http://www.w3.org/2005/Atom\"></feed>",
        );
        let found = locate(&fetcher, &config(), "https://feeds.example.org/").await;
        assert_eq!(found.as_deref(), Some("https://feeds.example.org/"));
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let fetcher = StubFetcher::new().page(ROOT, "text/html", "<html><body>Hello</body></html>");
        assert_eq!(locate(&fetcher, &config(), ROOT).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_root() {
        let fetcher = StubFetcher::new();
        assert_eq!(locate(&fetcher, &config(), ROOT).await, None);
    }

    #[test]
    fn test_alternate_feed_links_filters_types() {
        let base = Url::parse("https://example.org/site/").unwrap();
        let html = r#"<head>
            <link rel="alternate" type="text/html" href="/fr/">
            <link rel="alternate" type="application/atom+xml" href="atom">
            <link rel="Alternate home" type="application/rss+xml" href="https://cdn.example.org/rss">
            <link rel="icon" type="application/rss+xml" href="/nope">
        </head>"#;
        assert_eq!(
            alternate_feed_links(html, &base),
            vec![
                "https://example.org/site/atom".to_string(),
                "https://cdn.example.org/rss".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_find_news_section_tries_slash_then_bare() {
        let fetcher = StubFetcher::new().head("https://example.org/tribe/press-releases", "text/html");
        let found = find_news_section(&fetcher, &config(), "https://example.org/tribe").await;
        assert_eq!(found.as_deref(), Some("https://example.org/tribe/press-releases"));
        let calls = fetcher.calls();
        let sections = config().news_section_paths.len();
        assert_eq!(calls[0], "HEAD https://example.org/tribe/news/");
        assert_eq!(calls[1], "HEAD https://example.org/tribe/press-releases/");
        assert_eq!(calls[sections], "HEAD https://example.org/tribe/news");
        assert_eq!(calls.len(), sections + 2);
    }

    #[tokio::test]
    async fn test_find_news_section_none() {
        let fetcher = StubFetcher::new();
        assert_eq!(find_news_section(&fetcher, &config(), ROOT).await, None);
    }
}

//! Heuristic article scraping for sites without a usable feed.
//!
//! A page is fetched once and handed to an ordered chain of
//! [`ScrapeStrategy`] implementations. The first strategy that yields any
//! candidate wins; later strategies are not consulted.
//!
//! # Strategies
//!
//! | Order | Strategy | Module | Looks at |
//! |-------|----------|--------|----------|
//! | 1 | Container | [`container`] | `article`/`div`/`section` blocks with article-like classes |
//! | 2 | Broad link | [`broad`] | long-text links inside the main content region |
//!
//! Strategies only propose `(title, link, summary)` candidates. Deduplication
//! by link, the `max_articles` bound and the conversion to
//! [`ArticleRecord`] happen here so every strategy gets the same treatment.

pub mod broad;
pub mod container;

use crate::config::{HarvestConfig, ScrapeSettings, SummaryBound};
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, Published, Strategy, UNKNOWN};
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// File extensions that never point at an article page.
const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png", ".gif"];

/// One article proposed by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedItem {
    pub title: String,
    /// Absolute URL.
    pub link: String,
    pub summary: String,
}

/// Everything a strategy needs besides the document.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeContext<'a> {
    /// URL the document was fetched from; relative links resolve against it.
    pub page_url: &'a Url,
    pub settings: &'a ScrapeSettings,
    pub bound: &'a SummaryBound,
}

/// One way of finding articles in a parsed page.
pub trait ScrapeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidates in document order. May contain duplicate links.
    fn candidates(&self, document: &Html, ctx: &ScrapeContext<'_>) -> Vec<ScrapedItem>;
}

/// Ordered chain of strategies.
pub struct HeuristicScraper {
    strategies: Vec<Box<dyn ScrapeStrategy>>,
}

impl Default for HeuristicScraper {
    fn default() -> Self {
        Self::new(vec![
            Box::new(container::ContainerStrategy),
            Box::new(broad::BroadLinkStrategy),
        ])
    }
}

impl HeuristicScraper {
    pub fn new(strategies: Vec<Box<dyn ScrapeStrategy>>) -> Self {
        Self { strategies }
    }

    /// Fetch `page_url` and scrape up to `max_articles` articles from it.
    ///
    /// Any failure yields an empty list.
    #[instrument(level = "info", skip(self, fetcher, config))]
    pub async fn scrape<F: Fetcher>(
        &self,
        fetcher: &F,
        config: &HarvestConfig,
        page_url: &str,
        max_articles: usize,
    ) -> Vec<ArticleRecord> {
        let base = match Url::parse(page_url) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "Scrape target does not parse");
                return Vec::new();
            }
        };
        let page = match fetcher.get(page_url, config.timeouts.scrape()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Scrape fetch failed");
                return Vec::new();
            }
        };

        // Relative links resolve against the page actually served.
        let base = Url::parse(&page.final_url).unwrap_or(base);
        let bound = config.summary_bound();
        let ctx = ScrapeContext {
            page_url: &base,
            settings: &config.scrape,
            bound: &bound,
        };
        let records: Vec<ArticleRecord> = self
            .items_from_html(&page.body, &ctx, max_articles)
            .into_iter()
            .map(|item| ArticleRecord {
                title: item.title,
                link: item.link,
                published: Published::Scraped,
                summary: item.summary,
                source_url: page_url.to_string(),
                category: UNKNOWN.to_string(),
                region: UNKNOWN.to_string(),
                root_url: String::new(),
                pull_method: Strategy::Scrape,
            })
            .collect();
        info!(count = records.len(), "Scraped articles");
        records
    }

    /// Run the chain over an HTML document.
    pub fn items_from_html(
        &self,
        html: &str,
        ctx: &ScrapeContext<'_>,
        max_articles: usize,
    ) -> Vec<ScrapedItem> {
        if max_articles == 0 {
            return Vec::new();
        }
        let document = Html::parse_document(html);
        for strategy in &self.strategies {
            let items: Vec<ScrapedItem> = strategy
                .candidates(&document, ctx)
                .into_iter()
                .unique_by(|item| item.link.clone())
                .take(max_articles)
                .collect();
            if !items.is_empty() {
                debug!(strategy = strategy.name(), count = items.len(), "Strategy matched");
                return items;
            }
            debug!(strategy = strategy.name(), "Strategy found nothing");
        }
        Vec::new()
    }
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    collapse_whitespace(&raw)
}

/// `true` when `link` ends in a document or image extension.
pub(crate) fn is_document_link(link: &str) -> bool {
    let path = Url::parse(link)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| link.to_ascii_lowercase());
    DOCUMENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::fetch::stub::StubFetcher;
    use crate::models::SCRAPED_NO_DATE;

    const PAGE: &str = "https://example.org/news/";

    const CONTAINERS: &str = r#"<html><body>
      <article class="post">
        <h2 class="entry-title"><a href="/news/council-approves-budget">Council approves annual budget</a></h2>
        <p class="excerpt">The council met on <b>Tuesday</b>.</p>
      </article>
      <article class="post">
        <h2 class="entry-title"><a href="/news/council-approves-budget">Council approves annual budget</a></h2>
      </article>
      <article class="post">
        <h2 class="entry-title"><a href="/news/health-clinic-opens">New health clinic opens downtown</a></h2>
      </article>
      <div class="card"><a href="/news/short">Short</a></div>
    </body></html>"#;

    const BROAD_ONLY: &str = r#"<html><body>
      <main id="main-content">
        <a href="/press-release/water-rights-settlement">Water rights settlement reached this week</a>
        <a href="/category/news">Browse every category of our news</a>
        <a href="/media/annual-report.pdf">Download the annual media report here</a>
        <a href="/news/too-short">Too short</a>
      </main>
    </body></html>"#;

    struct Fixed(&'static str, Vec<ScrapedItem>);

    impl ScrapeStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn candidates(&self, _document: &Html, _ctx: &ScrapeContext<'_>) -> Vec<ScrapedItem> {
            self.1.clone()
        }
    }

    fn item(link: &str) -> ScrapedItem {
        ScrapedItem {
            title: format!("Title for {link}"),
            link: link.to_string(),
            summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_container_strategy_records() {
        let fetcher = StubFetcher::new().page(PAGE, "text/html", CONTAINERS);
        let records = HeuristicScraper::default()
            .scrape(&fetcher, &HarvestConfig::default(), PAGE, 5)
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Council approves annual budget");
        assert_eq!(records[0].link, "https://example.org/news/council-approves-budget");
        assert_eq!(records[0].summary, "The council met on Tuesday.");
        assert_eq!(records[1].link, "https://example.org/news/health-clinic-opens");
        for r in &records {
            assert_eq!(r.published.to_string(), SCRAPED_NO_DATE);
            assert_eq!(r.pull_method, Strategy::Scrape);
            assert_eq!(r.source_url, PAGE);
        }
    }

    #[tokio::test]
    async fn test_broad_fallback_filters_links() {
        let fetcher = StubFetcher::new().page(PAGE, "text/html", BROAD_ONLY);
        let records = HeuristicScraper::default()
            .scrape(&fetcher, &HarvestConfig::default(), PAGE, 5)
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].link,
            "https://example.org/press-release/water-rights-settlement"
        );
        assert_eq!(records[0].summary, "");
    }

    #[tokio::test]
    async fn test_bounded_by_max_articles() {
        let fetcher = StubFetcher::new().page(PAGE, "text/html", CONTAINERS);
        let records = HeuristicScraper::default()
            .scrape(&fetcher, &HarvestConfig::default(), PAGE, 1)
            .await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_empty() {
        let fetcher = StubFetcher::new().fail(PAGE, FetchError::Status(500));
        let records = HeuristicScraper::default()
            .scrape(&fetcher, &HarvestConfig::default(), PAGE, 5)
            .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_page_without_articles_is_empty() {
        let fetcher = StubFetcher::new().page(PAGE, "text/html", "<html><body><p>Welcome</p></body></html>");
        let records = HeuristicScraper::default()
            .scrape(&fetcher, &HarvestConfig::default(), PAGE, 5)
            .await;
        assert!(records.is_empty());
    }

    #[test]
    fn test_first_non_empty_strategy_wins() {
        let scraper = HeuristicScraper::new(vec![
            Box::new(Fixed("empty", vec![])),
            Box::new(Fixed("second", vec![item("https://a/1"), item("https://a/1"), item("https://a/2")])),
            Box::new(Fixed("third", vec![item("https://b/1")])),
        ]);
        let base = Url::parse(PAGE).unwrap();
        let config = HarvestConfig::default();
        let bound = config.summary_bound();
        let ctx = ScrapeContext {
            page_url: &base,
            settings: &config.scrape,
            bound: &bound,
        };
        let items = scraper.items_from_html("<html></html>", &ctx, 5);
        let links: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["https://a/1", "https://a/2"]);
    }

    #[test]
    fn test_is_document_link() {
        assert!(is_document_link("https://example.org/files/Report.PDF"));
        assert!(is_document_link("https://example.org/img/photo.jpeg?size=large"));
        assert!(!is_document_link("https://example.org/news/pdf-guide"));
    }
}

//! Per-source strategy selection.
//!
//! Each source walks an explicit state machine:
//!
//! ```text
//! Start → Locating → Validating → Extracting → Done
//!              │            │
//!              └────────────┴──→ Scraping ───→ Done
//! ```
//!
//! A located feed that fails validation, or no feed at all, sends the source
//! to scraping. A valid feed that extracts nothing is accepted as-is; it is
//! not retried as a scrape in the same pass. A scrape that finds nothing
//! records [`Strategy::None`].

use crate::config::HarvestConfig;
use crate::discovery::extractor::extract;
use crate::discovery::locator::{find_news_section, locate};
use crate::discovery::validator::validate;
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, ResolvedSource, SourceDescriptor, Strategy};
use crate::scrapers::HeuristicScraper;
use tracing::{debug, info, instrument, warn};

/// How many records to pull per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullLimits {
    pub feed_entries: usize,
    pub scraped_articles: usize,
}

impl PullLimits {
    /// Full-size pulls, used by `run` and `aggregate`.
    pub fn full(config: &HarvestConfig) -> Self {
        Self {
            feed_entries: config.max_feed_entries,
            scraped_articles: config.max_scraped_articles,
        }
    }

    /// Sample-size pulls, used by `discover`.
    pub fn sample(config: &HarvestConfig) -> Self {
        Self {
            feed_entries: config.sample_feed_entries,
            scraped_articles: config.sample_scraped_articles,
        }
    }
}

/// Outcome of resolving one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: ResolvedSource,
    pub articles: Vec<ArticleRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolveState {
    Start,
    Locating,
    Validating { candidate: String },
    Extracting { feed_url: String },
    Scraping,
    Done {
        strategy: Strategy,
        effective_url: String,
        articles: Vec<ArticleRecord>,
    },
}

impl ResolveState {
    fn name(&self) -> &'static str {
        match self {
            ResolveState::Start => "start",
            ResolveState::Locating => "locating",
            ResolveState::Validating { .. } => "validating",
            ResolveState::Extracting { .. } => "extracting",
            ResolveState::Scraping => "scraping",
            ResolveState::Done { .. } => "done",
        }
    }
}

/// Drives sources through discovery with a shared fetcher and config.
pub struct SourceResolver<'a, F> {
    fetcher: &'a F,
    config: &'a HarvestConfig,
    scraper: &'a HeuristicScraper,
}

impl<'a, F: Fetcher> SourceResolver<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a HarvestConfig, scraper: &'a HeuristicScraper) -> Self {
        Self {
            fetcher,
            config,
            scraper,
        }
    }

    /// Pick a strategy for `source` and pull its articles.
    ///
    /// Never fails: every remote problem ends in a scrape attempt or in
    /// [`Strategy::None`].
    #[instrument(level = "info", skip_all, fields(source = %source.display_name()))]
    pub async fn resolve(&self, source: &SourceDescriptor, limits: PullLimits) -> Resolution {
        let root = source.root_url.as_str();
        let mut state = ResolveState::Start;
        loop {
            state = match state {
                ResolveState::Start => ResolveState::Locating,
                ResolveState::Locating => match locate(self.fetcher, self.config, root).await {
                    Some(candidate) => ResolveState::Validating { candidate },
                    None => {
                        info!("No feed found; falling back to scraping");
                        ResolveState::Scraping
                    }
                },
                ResolveState::Validating { candidate } => {
                    if validate(self.fetcher, self.config, &candidate).await {
                        ResolveState::Extracting {
                            feed_url: candidate,
                        }
                    } else {
                        info!(feed = %candidate, "Feed failed validation; falling back to scraping");
                        ResolveState::Scraping
                    }
                }
                ResolveState::Extracting { feed_url } => {
                    let articles =
                        extract(self.fetcher, self.config, &feed_url, limits.feed_entries).await;
                    if articles.is_empty() {
                        warn!(feed = %feed_url, "Valid feed yielded no articles");
                    }
                    ResolveState::Done {
                        strategy: Strategy::Feed,
                        effective_url: feed_url,
                        articles,
                    }
                }
                ResolveState::Scraping => {
                    let (effective_url, articles) =
                        self.scrape_with_fallback(root, limits.scraped_articles).await;
                    let strategy = if articles.is_empty() {
                        warn!(page = %effective_url, "Scraping found no articles");
                        Strategy::None
                    } else {
                        Strategy::Scrape
                    };
                    ResolveState::Done {
                        strategy,
                        effective_url,
                        articles,
                    }
                }
                ResolveState::Done {
                    strategy,
                    effective_url,
                    articles,
                } => {
                    info!(%strategy, url = %effective_url, count = articles.len(), "Source resolved");
                    return finish(source, strategy, effective_url, articles);
                }
            };
            debug!(state = state.name(), "Transition");
        }
    }

    /// Pull articles with a strategy chosen earlier.
    ///
    /// A feed that now yields nothing falls back to scraping the root page.
    /// The returned [`ResolvedSource`] names the strategy and URL that
    /// actually produced the articles, so every record's `sourceUrl` matches
    /// its `effective_url`.
    ///
    /// # Arguments
    ///
    /// * `resolved` - A source as persisted by the discovery pass.
    /// * `limits` - Entry and article bounds for this pull.
    #[instrument(level = "info", skip_all, fields(source = %resolved.source.display_name(), strategy = %resolved.strategy))]
    pub async fn pull(&self, resolved: &ResolvedSource, limits: PullLimits) -> Resolution {
        let root = resolved.source.root_url.as_str();
        let effective_url = resolved.effective_url.clone();
        let (strategy, effective_url, articles) = match resolved.strategy {
            Strategy::Feed => {
                let articles =
                    extract(self.fetcher, self.config, &effective_url, limits.feed_entries).await;
                if articles.is_empty() {
                    info!("Feed yielded nothing; scraping root page");
                    let scraped = self
                        .scraper
                        .scrape(self.fetcher, self.config, root, limits.scraped_articles)
                        .await;
                    if scraped.is_empty() {
                        (Strategy::Feed, effective_url, scraped)
                    } else {
                        (Strategy::Scrape, root.to_string(), scraped)
                    }
                } else {
                    (Strategy::Feed, effective_url, articles)
                }
            }
            Strategy::Scrape => {
                let articles = self
                    .scraper
                    .scrape(
                        self.fetcher,
                        self.config,
                        &effective_url,
                        limits.scraped_articles,
                    )
                    .await;
                (Strategy::Scrape, effective_url, articles)
            }
            Strategy::None => (Strategy::None, effective_url, Vec::new()),
        };
        finish(&resolved.source, strategy, effective_url, articles)
    }

    /// Scrape the news section if enabled and found, then the root page if
    /// the section yielded nothing.
    async fn scrape_with_fallback(&self, root: &str, max: usize) -> (String, Vec<ArticleRecord>) {
        let section = if self.config.discover_news_section {
            find_news_section(self.fetcher, self.config, root).await
        } else {
            None
        };
        if let Some(section) = section.filter(|s| s != root) {
            let articles = self.scraper.scrape(self.fetcher, self.config, &section, max).await;
            if !articles.is_empty() {
                return (section, articles);
            }
            debug!(%section, "News section yielded nothing; trying root page");
        }
        let articles = self.scraper.scrape(self.fetcher, self.config, root, max).await;
        (root.to_string(), articles)
    }
}

fn stamp_root(mut articles: Vec<ArticleRecord>, root: &str) -> Vec<ArticleRecord> {
    for article in &mut articles {
        article.root_url = root.to_string();
    }
    articles
}

fn finish(
    source: &SourceDescriptor,
    strategy: Strategy,
    effective_url: String,
    articles: Vec<ArticleRecord>,
) -> Resolution {
    let articles = stamp_root(articles, &source.root_url);
    Resolution {
        resolved: ResolvedSource {
            source: source.clone(),
            strategy,
            effective_url,
            article_count: articles.len(),
        },
        articles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use crate::models::{NO_DATE, Published, SCRAPED_NO_DATE};

    const ROOT: &str = "https://nation.example/";
    const FEED: &str = "https://nation.example/feed/";

    const FEED_XML: &str = r#"<rss version="2.0"><channel><title>Nation</title>
        <item><title>Dated entry</title><link>https://nation.example/news/1</link>
          <pubDate>Tue, 06 May 2025 10:00:00 GMT</pubDate></item>
        <item><title>Undated entry</title><link>https://nation.example/news/2</link></item>
        <item><title>Another dated</title><link>https://nation.example/news/3</link>
          <pubDate>Mon, 05 May 2025 10:00:00 GMT</pubDate></item>
    </channel></rss>"#;

    const ARTICLE_PAGE: &str = r#"<html><body>
        <article class="post"><h2 class="entry-title"><a href="/news/road-project">Road project breaks ground</a></h2></article>
        <article class="post"><h2 class="entry-title"><a href="/news/election-results">Election results certified</a></h2></article>
    </body></html>"#;

    fn config() -> HarvestConfig {
        HarvestConfig::default()
    }

    fn full() -> PullLimits {
        PullLimits::full(&config())
    }

    async fn resolve(fetcher: &StubFetcher, config: &HarvestConfig) -> Resolution {
        let scraper = HeuristicScraper::default();
        SourceResolver::new(fetcher, config, &scraper)
            .resolve(&SourceDescriptor::new(ROOT), PullLimits::full(config))
            .await
    }

    #[tokio::test]
    async fn test_feed_path() {
        let fetcher = StubFetcher::new().page(FEED, "application/rss+xml", FEED_XML);
        let res = resolve(&fetcher, &config()).await;

        assert_eq!(res.resolved.strategy, Strategy::Feed);
        assert_eq!(res.resolved.effective_url, FEED);
        assert_eq!(res.resolved.article_count, 3);
        assert_eq!(res.articles.len(), 3);
        assert_eq!(res.articles[1].published.to_string(), NO_DATE);
        assert!(res.articles.iter().all(|a| a.root_url == ROOT));
        assert!(res.articles.iter().all(|a| a.source_url == FEED));
    }

    #[tokio::test]
    async fn test_no_feed_scrapes_root() {
        let fetcher = StubFetcher::new().page(ROOT, "text/html", ARTICLE_PAGE);
        let res = resolve(&fetcher, &config()).await;

        assert_eq!(res.resolved.strategy, Strategy::Scrape);
        assert_eq!(res.resolved.effective_url, ROOT);
        assert_eq!(res.articles.len(), 2);
        for a in &res.articles {
            assert_eq!(a.published, Published::Scraped);
            assert_eq!(a.published.to_string(), SCRAPED_NO_DATE);
            assert_eq!(a.root_url, ROOT);
        }
    }

    #[tokio::test]
    async fn test_invalid_feed_scrapes() {
        let fetcher = StubFetcher::new()
            .page(FEED, "application/rss+xml", r#"<rss version="2.0"><channel><title>Quiet</title></channel></rss>"#)
            .page(ROOT, "text/html", ARTICLE_PAGE);
        let res = resolve(&fetcher, &config()).await;
        assert_eq!(res.resolved.strategy, Strategy::Scrape);
        assert_eq!(res.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_found_is_none() {
        let fetcher = StubFetcher::new().page(ROOT, "text/html", "<html><body>Closed</body></html>");
        let res = resolve(&fetcher, &config()).await;
        assert_eq!(res.resolved.strategy, Strategy::None);
        assert_eq!(res.resolved.article_count, 0);
        assert!(res.articles.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_source_is_none() {
        let fetcher = StubFetcher::new();
        let res = resolve(&fetcher, &config()).await;
        assert_eq!(res.resolved.strategy, Strategy::None);
        assert_eq!(res.resolved.effective_url, ROOT);
    }

    #[tokio::test]
    async fn test_news_section_preferred_when_enabled() {
        let section = "https://nation.example/news/";
        let fetcher = StubFetcher::new()
            .page(section, "text/html", ARTICLE_PAGE)
            .page(ROOT, "text/html", "<html></html>");
        let mut config = config();
        config.discover_news_section = true;
        let res = resolve(&fetcher, &config).await;
        assert_eq!(res.resolved.strategy, Strategy::Scrape);
        assert_eq!(res.resolved.effective_url, section);
    }

    #[tokio::test]
    async fn test_empty_news_section_falls_back_to_root() {
        let section = "https://nation.example/news/";
        let fetcher = StubFetcher::new()
            .page(section, "text/html", "<html><body>Soon</body></html>")
            .page(ROOT, "text/html", ARTICLE_PAGE);
        let mut config = config();
        config.discover_news_section = true;
        let res = resolve(&fetcher, &config).await;
        assert_eq!(res.resolved.effective_url, ROOT);
        assert_eq!(res.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_pull_feed_falls_back_to_root_scrape() {
        let fetcher = StubFetcher::new()
            .page(FEED, "application/rss+xml", r#"<rss version="2.0"><channel><title>Quiet</title></channel></rss>"#)
            .page(ROOT, "text/html", ARTICLE_PAGE);
        let config = config();
        let scraper = HeuristicScraper::default();
        let resolved = ResolvedSource {
            source: SourceDescriptor::new(ROOT),
            strategy: Strategy::Feed,
            effective_url: FEED.to_string(),
            article_count: 3,
        };
        let pulled = SourceResolver::new(&fetcher, &config, &scraper)
            .pull(&resolved, full())
            .await;
        assert_eq!(pulled.articles.len(), 2);
        assert!(pulled.articles.iter().all(|a| a.pull_method == Strategy::Scrape));
        assert!(pulled.articles.iter().all(|a| a.root_url == ROOT));
        assert_eq!(pulled.resolved.strategy, Strategy::Scrape);
        assert_eq!(pulled.resolved.effective_url, ROOT);
        assert_eq!(pulled.resolved.article_count, 2);
        assert!(
            pulled
                .articles
                .iter()
                .all(|a| a.source_url == pulled.resolved.effective_url)
        );
    }

    #[tokio::test]
    async fn test_pull_feed_keeps_feed_url() {
        let fetcher = StubFetcher::new().page(FEED, "application/rss+xml", FEED_XML);
        let config = config();
        let scraper = HeuristicScraper::default();
        let resolved = ResolvedSource {
            source: SourceDescriptor::new(ROOT),
            strategy: Strategy::Feed,
            effective_url: FEED.to_string(),
            article_count: 0,
        };
        let pulled = SourceResolver::new(&fetcher, &config, &scraper)
            .pull(&resolved, full())
            .await;
        assert_eq!(pulled.resolved.strategy, Strategy::Feed);
        assert_eq!(pulled.resolved.effective_url, FEED);
        assert!(!pulled.articles.is_empty());
        assert!(pulled.articles.iter().all(|a| a.source_url == FEED));
    }

    #[tokio::test]
    async fn test_pull_none_makes_no_requests() {
        let fetcher = StubFetcher::new();
        let config = config();
        let scraper = HeuristicScraper::default();
        let resolved = ResolvedSource {
            source: SourceDescriptor::new(ROOT),
            strategy: Strategy::None,
            effective_url: ROOT.to_string(),
            article_count: 0,
        };
        let pulled = SourceResolver::new(&fetcher, &config, &scraper)
            .pull(&resolved, full())
            .await;
        assert!(pulled.articles.is_empty());
        assert_eq!(pulled.resolved.strategy, Strategy::None);
        assert!(fetcher.calls().is_empty());
    }
}

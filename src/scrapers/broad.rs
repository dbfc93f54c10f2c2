//! Broad-link strategy: long-text links inside the main content region.
//!
//! Used when a page has no recognizable teaser blocks. Only the link text and
//! URL are available, so summaries are left empty.

use super::{ScrapeContext, ScrapeStrategy, ScrapedItem, element_text, is_document_link};
use crate::utils::resolve_link;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static REGION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)main-content|content|body|primary|page-content").unwrap());
static ARTICLE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)news|article|story|post|press|media|release").unwrap());
static EXCLUDED_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)category|tag|archive|page|contact|about|login|subscribe|#").unwrap()
});

static REGIONS: Lazy<Selector> = Lazy::new(|| Selector::parse("main[id], div[id], section[id]").unwrap());
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

pub struct BroadLinkStrategy;

impl ScrapeStrategy for BroadLinkStrategy {
    fn name(&self) -> &'static str {
        "broad-link"
    }

    fn candidates(&self, document: &Html, ctx: &ScrapeContext<'_>) -> Vec<ScrapedItem> {
        let min_text = ctx.settings.min_link_text_chars;
        document
            .select(&REGIONS)
            .filter(|region| region.value().attr("id").is_some_and(|id| REGION_ID.is_match(id)))
            .flat_map(|region| region.select(&LINKS))
            .filter_map(|a| {
                let title = element_text(a);
                if title.chars().count() <= min_text {
                    return None;
                }
                let link = resolve_link(ctx.page_url, a.value().attr("href")?)?;
                let keep = ARTICLE_LINK.is_match(&link)
                    && !EXCLUDED_LINK.is_match(&link)
                    && !is_document_link(&link);
                keep.then(|| ScrapedItem {
                    title,
                    link,
                    summary: String::new(),
                })
            })
            .collect()
    }
}

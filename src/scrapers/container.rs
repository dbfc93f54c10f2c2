//! Container strategy: blocks whose class marks them as an article teaser.
//!
//! Within each matching `article`/`div`/`section`, the first link is the
//! article link, a heading with a title-like class (else any heading, else the
//! link text) is the title, and the first excerpt-like block is the summary.

use super::{ScrapeContext, ScrapeStrategy, ScrapedItem, element_text, is_document_link};
use crate::utils::{resolve_link, truncate_summary};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static CONTAINER_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)news-item|post|article|story|entry|hentry|listing-item|card|blog-post|news-listing|story-listing").unwrap()
});
static TITLE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)title|heading|post-title|entry-title").unwrap());
static SUMMARY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)summary|description|excerpt|entry-content").unwrap());
static ARTICLE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)news|article|story|post|press|media").unwrap());

static CONTAINERS: Lazy<Selector> = Lazy::new(|| Selector::parse("article, div, section").unwrap());
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADINGS: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5").unwrap());
static SUMMARIES: Lazy<Selector> = Lazy::new(|| Selector::parse("p, div").unwrap());

pub struct ContainerStrategy;

impl ScrapeStrategy for ContainerStrategy {
    fn name(&self) -> &'static str {
        "container"
    }

    fn candidates(&self, document: &Html, ctx: &ScrapeContext<'_>) -> Vec<ScrapedItem> {
        document
            .select(&CONTAINERS)
            .filter(|el| has_class(*el, &CONTAINER_CLASS))
            .filter_map(|el| item_from_container(el, ctx))
            .collect()
    }
}

fn has_class(el: ElementRef<'_>, pattern: &Regex) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|class| pattern.is_match(class))
}

fn item_from_container(container: ElementRef<'_>, ctx: &ScrapeContext<'_>) -> Option<ScrapedItem> {
    let link_el = container.select(&LINKS).next()?;
    let link = resolve_link(ctx.page_url, link_el.value().attr("href")?)?;
    if !ARTICLE_LINK.is_match(&link) || is_document_link(&link) {
        return None;
    }

    let headings: Vec<ElementRef<'_>> = container.select(&HEADINGS).collect();
    let title = headings
        .iter()
        .find(|h| has_class(**h, &TITLE_CLASS))
        .or(headings.first())
        .map(|h| element_text(*h))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| element_text(link_el));
    if title.chars().count() <= ctx.settings.min_container_title_chars {
        return None;
    }

    let summary = container
        .select(&SUMMARIES)
        .find(|el| has_class(*el, &SUMMARY_CLASS))
        .map(|el| truncate_summary(&element_text(el), ctx.bound))
        .unwrap_or_default();

    Some(ScrapedItem {
        title,
        link,
        summary,
    })
}

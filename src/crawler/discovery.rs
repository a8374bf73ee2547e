//! Article link discovery over paginated listing pages
//!
//! Listing pages are parsed for:
//! - Links that match the configured article pattern (query and fragment
//!   dropped, first-seen order kept)
//! - The `rel="next"` link to the following listing page

use crate::config::{CrawlerConfig, DiscoveryConfig};
use crate::crawler::fetcher::{Dialed, Fetcher};
use crate::{ConfigError, FetchError, HarvestError};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// What one listing page yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Canonical article URLs, deduplicated, in page order
    pub articles: Vec<Url>,
    /// Next listing page, if the page links one
    pub next_page: Option<Url>,
}

/// Parses a listing page
pub fn parse_listing(html: &str, base_url: &Url, pattern: &Regex) -> Listing {
    let document = Html::parse_document(html);
    let mut listing = Listing::default();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(mut link) = resolve_link(href, base_url) else {
                continue;
            };

            link.set_query(None);
            link.set_fragment(None);

            if pattern.is_match(link.as_str()) && seen.insert(link.to_string()) {
                listing.articles.push(link);
            }
        }
    }

    if let Ok(next_selector) = Selector::parse("link[rel='next'][href], a[rel='next'][href]") {
        listing.next_page = document
            .select(&next_selector)
            .filter_map(|element| element.value().attr("href"))
            .find_map(|href| resolve_link(href, base_url));
    }

    listing
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Finds article links starting from index pages
#[derive(Debug, Clone)]
pub struct LinkDiscovery {
    fetcher: Fetcher,
    pattern: Regex,
    max_pages: u32,
}

impl LinkDiscovery {
    pub fn new(
        fetcher: Fetcher,
        discovery: &DiscoveryConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&discovery.article_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!(
                "Invalid article pattern '{}': {}",
                discovery.article_pattern, e
            ))
        })?;

        Ok(Self {
            fetcher,
            pattern,
            max_pages: crawler.max_index_pages,
        })
    }

    /// Collects article links from `index_url` and its following pages
    ///
    /// A failure on the first page is an error. A failure on a later page
    /// ends pagination and returns what was collected so far.
    pub async fn discover_links(&self, index_url: &str) -> Result<Vec<Url>, HarvestError> {
        let first = Url::parse(index_url).map_err(|source| HarvestError::InvalidUrl {
            url: index_url.to_string(),
            source,
        })?;

        let mut links = Vec::new();
        let mut known = HashSet::new();
        let mut visited = HashSet::new();
        let mut next = Some(first);
        let mut pages = 0u32;

        while let Some(page_url) = next.take() {
            if pages >= self.max_pages || !visited.insert(page_url.to_string()) {
                break;
            }
            pages += 1;

            let page = match self.fetcher.dial(page_url.as_str()).await {
                Ok(Dialed::Page(page)) => page,
                Ok(Dialed::Malformed) if pages == 1 => {
                    return Err(HarvestError::Fetch {
                        url: page_url.to_string(),
                        source: FetchError::Malformed,
                    });
                }
                Ok(Dialed::Malformed) => {
                    warn!("Listing page {} sent a malformed response, stopping", page_url);
                    break;
                }
                Err(e) if pages == 1 || matches!(e, HarvestError::Cancelled { .. }) => {
                    return Err(e)
                }
                Err(e) => {
                    warn!("Listing page {} failed, stopping pagination: {}", page_url, e);
                    break;
                }
            };

            let listing = parse_listing(&page.raw, &page.final_url, &self.pattern);
            debug!(
                "Listing page {} yielded {} article links",
                page_url,
                listing.articles.len()
            );

            for link in listing.articles {
                if known.insert(link.to_string()) {
                    links.push(link);
                }
            }
            next = listing.next_page;
        }

        Ok(links)
    }

    /// Collects links from every index URL into one deduplicated list
    ///
    /// Failing indexes are logged and skipped. Cancellation stops early and
    /// returns what was found.
    pub async fn discover_all(&self, index_urls: &[String]) -> Vec<Url> {
        let mut links = Vec::new();
        let mut known = HashSet::new();

        for index_url in index_urls {
            match self.discover_links(index_url).await {
                Ok(found) => {
                    info!("Discovered {} article links from {}", found.len(), index_url);
                    for link in found {
                        if known.insert(link.to_string()) {
                            links.push(link);
                        }
                    }
                }
                Err(HarvestError::Cancelled { .. }) => {
                    warn!("Discovery cancelled at {}", index_url);
                    break;
                }
                Err(e) => warn!("Skipping index {}: {}", index_url, e),
            }
        }

        links
    }
}

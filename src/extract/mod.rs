//! Article body extraction
//!
//! This module handles:
//! - Following the inline script redirect some article pages use
//! - Paywall detection (ignore-domains and marker phrases)
//! - Section classification and dispatch to a [`SectionExtractor`]
//! - Rendering the selected nodes to markdown fragments

pub mod dom;
pub mod rewrite;
pub mod section;

pub use dom::{element_at, elements_by_tag, elements_by_tag_and_class, remove_by_tag};
pub use rewrite::{RewriteRule, RewriteRules};
pub use section::{
    ExtractorRegistry, MainExtractor, MoneyExtractor, OpinionExtractor, RenderError, Section,
    SectionExtractor, VisionExtractor,
};

use crate::article::{Exclusion, Screened};
use crate::config::FilterConfig;
use crate::crawler::{Dialed, FetchedPage, Fetcher};
use crate::HarvestError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Paragraph marking the start of related-links boilerplate
pub const FURTHER_READING: &str = "延伸閱讀：";

/// Markdown hard line break appended to every fragment
pub const LINE_BREAK: &str = "  \n";

static REDIRECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)<script language=javascript>window\.location\.href="(.*?)";</script>"#)
        .expect("redirect regex is valid")
});

/// Returns the target of an inline script redirect, if the page has one
pub fn find_redirect(raw: &str) -> Option<String> {
    REDIRECT
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|target| target.as_str().to_string())
}

/// Returns true if the raw page contains a subscription-wall phrase
pub fn is_paywalled(raw: &str, filters: &FilterConfig) -> bool {
    filters
        .paywall_markers
        .iter()
        .any(|marker| raw.contains(marker.as_str()))
}

/// Returns true if a redirect target points at an ignored (paid) domain
pub fn is_ignored_target(target: &str, filters: &FilterConfig) -> bool {
    filters
        .ignore_domains
        .iter()
        .any(|domain| target.contains(domain.as_str()))
}

/// Runs one extractor over a fetched page
///
/// Extraction stops at the first fragment containing [`FURTHER_READING`].
/// Blank fragments are dropped; every kept fragment ends in [`LINE_BREAK`].
pub fn run_extractor(
    extractor: &dyn SectionExtractor,
    page: &FetchedPage,
) -> Result<String, RenderError> {
    let mut document = page.document();
    let rules = RewriteRules::for_origin(&page.origin());
    let nodes = extractor.select_nodes(&mut document);

    let mut body = String::new();
    for node in nodes {
        let fragment = extractor.render_node(&document, node, &rules)?;
        if fragment.contains(FURTHER_READING) {
            break;
        }
        if fragment.trim().is_empty() {
            continue;
        }
        body.push_str(&fragment);
        body.push_str(LINE_BREAK);
    }

    Ok(extractor.post_process(body))
}

/// Extracts the article body of `page`
///
/// Exclusions come back as [`Screened::Excluded`] with an empty body. A
/// redirect target that cannot be fetched yields an empty body rather than
/// an error; only cancellation and render failures are errors.
pub async fn extract_content(
    page: &FetchedPage,
    fetcher: &Fetcher,
    filters: &FilterConfig,
    registry: &ExtractorRegistry,
) -> Result<Screened<String>, HarvestError> {
    let target = match find_redirect(&page.raw) {
        Some(target) => target,
        None => return extract_section(page, Section::Main, registry).map(Screened::Kept),
    };

    if is_ignored_target(&target, filters) {
        return Ok(Screened::Excluded(String::new(), Exclusion::IgnoreVip));
    }

    let target = match page.final_url.join(&target) {
        Ok(url) => url,
        Err(e) => {
            warn!(url = %page.url, "unusable redirect target '{}': {}", target, e);
            return Ok(Screened::Kept(String::new()));
        }
    };

    let redirected = match fetcher.dial(target.as_str()).await {
        Ok(Dialed::Page(redirected)) => redirected,
        Ok(Dialed::Malformed) => {
            warn!(url = %page.url, "redirect target {} sent a malformed response", target);
            return Ok(Screened::Kept(String::new()));
        }
        Err(e @ HarvestError::Cancelled { .. }) => return Err(e),
        Err(e) => {
            warn!(url = %page.url, "redirect target unavailable: {}", e);
            return Ok(Screened::Kept(String::new()));
        }
    };

    if is_paywalled(&page.raw, filters) {
        return Ok(Screened::Excluded(String::new(), Exclusion::IgnoreVip));
    }

    let section = Section::classify(target.as_str());
    debug!(url = %page.url, %section, "following redirect to {}", target);

    extract_section(&redirected, section, registry).map(Screened::Kept)
}

fn extract_section(
    page: &FetchedPage,
    section: Section,
    registry: &ExtractorRegistry,
) -> Result<String, HarvestError> {
    let extractor = match registry.get(section).or_else(|| registry.get(Section::Main)) {
        Some(extractor) => extractor,
        None => {
            warn!(url = %page.url, %section, "no extractor registered");
            return Ok(String::new());
        }
    };

    run_extractor(extractor, page).map_err(|e| HarvestError::Render {
        url: page.url.clone(),
        message: e.to_string(),
    })
}

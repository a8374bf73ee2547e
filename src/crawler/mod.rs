//! Crawler module for discovering and fetching articles
//!
//! This module contains the crawling side of the harvester, including:
//! - HTTP fetching with timeout, cancellation and error classification
//! - Link discovery over paginated index pages
//! - Per-cycle statistics
//! - Overall crawl coordination

mod coordinator;
mod discovery;
mod fetcher;
mod stats;

pub use coordinator::{run_crawl, Coordinator};
pub use discovery::{parse_listing, LinkDiscovery, Listing};
pub use fetcher::{build_http_client, Dialed, FetchedPage, Fetcher};
pub use stats::CrawlStats;

//! Per-cycle crawl counters

use crate::article::Exclusion;
use std::fmt;

/// Outcome counts for one crawl cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Article links found on the index pages
    pub discovered: u64,

    /// Articles written to storage
    pub stored: u64,

    /// Rejected for an ignored category
    pub ignored_category: u64,

    /// Rejected as paywalled
    pub ignored_vip: u64,

    /// Rejected as older than the freshness window
    pub stale: u64,

    /// Fetch, extraction or storage failures
    pub failed: u64,

    /// Discarded because the crawl was cancelled
    pub cancelled: u64,
}

impl CrawlStats {
    pub fn record_rejection(&mut self, reason: Exclusion) {
        match reason {
            Exclusion::IgnoreCate => self.ignored_category += 1,
            Exclusion::IgnoreVip => self.ignored_vip += 1,
            Exclusion::TimeOverDays => self.stale += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.ignored_category + self.ignored_vip + self.stale
    }

    /// Articles that reached a final outcome, cancelled ones included
    pub fn processed(&self) -> u64 {
        self.stored + self.rejected() + self.failed + self.cancelled
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discovered={} stored={} ignored_category={} ignored_vip={} stale={} failed={} cancelled={}",
            self.discovered,
            self.stored,
            self.ignored_category,
            self.ignored_vip,
            self.stale,
            self.failed,
            self.cancelled
        )
    }
}

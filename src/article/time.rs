//! Publish time extraction and freshness screening

use crate::article::{Exclusion, Screened};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static DATE_PUBLISHED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""datePublished"\s*:\s*"([^"]*)""#).expect("datePublished regex is valid")
});

/// The site's local offset (UTC+8), used for display
pub fn shanghai() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("UTC+8 is within range")
}

/// Finds the first `"datePublished"` value in the raw page
///
/// A missing or unparseable value yields `now`. Articles older than
/// `window` are excluded; future timestamps are kept.
pub fn fetch_update_time(
    raw: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Screened<DateTime<Utc>> {
    let published = match DATE_PUBLISHED.captures(raw).and_then(|c| c.get(1)) {
        Some(value) => match DateTime::parse_from_rfc3339(value.as_str()) {
            Ok(time) => time.with_timezone(&Utc),
            Err(e) => {
                warn!("unparseable datePublished '{}': {}", value.as_str(), e);
                now
            }
        },
        None => now,
    };

    if now.signed_duration_since(published) > window {
        Screened::Excluded(published, Exclusion::TimeOverDays)
    } else {
        Screened::Kept(published)
    }
}

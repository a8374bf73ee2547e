//! Article model and the per-URL assembly pipeline
//!
//! This module contains:
//! - The persisted [`Article`] entity and its content-addressed id
//! - Title, publish-time and formatting helpers
//! - Script conversion of the finished content
//! - The [`Assembler`] that drives one URL from fetch to finished article

pub mod assembler;
pub mod format;
pub mod time;
pub mod title;
pub mod translate;

pub use assembler::Assembler;
pub use format::format_content;
pub use time::{fetch_update_time, shanghai};
pub use title::{fetch_title, sanitize_title};
pub use translate::{converter_for, HanConverter, Passthrough, ScriptConverter, TranslateError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A harvested news article, ready for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Hex SHA-256 of `source_url`
    pub id: String,
    pub title: String,
    /// Formatted markdown body (see [`format_content`])
    pub content: String,
    pub website_id: String,
    pub website_domain: String,
    pub website_title: String,
    pub update_time: DateTime<Utc>,
    /// The URL that was requested, before any redirect
    pub source_url: String,
}

/// Derives the article id from its source URL
pub fn article_id(source_url: &str) -> String {
    hex::encode(Sha256::digest(source_url.as_bytes()))
}

/// Why a successfully fetched article is not stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exclusion {
    /// The title names an ignored category
    IgnoreCate,
    /// The article sits behind the subscription wall
    IgnoreVip,
    /// The article is older than the freshness window
    TimeOverDays,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IgnoreCate => "ignore_cate",
            Self::IgnoreVip => "ignore_vip",
            Self::TimeOverDays => "time_over_days",
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value produced by one pipeline stage, possibly flagged for exclusion
///
/// The value is carried in both cases so callers can still log it, e.g. the
/// publish time of a stale article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screened<T> {
    Kept(T),
    Excluded(T, Exclusion),
}

impl<T> Screened<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Kept(value) | Self::Excluded(value, _) => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Kept(value) | Self::Excluded(value, _) => value,
        }
    }

    pub fn exclusion(&self) -> Option<Exclusion> {
        match self {
            Self::Kept(_) => None,
            Self::Excluded(_, reason) => Some(*reason),
        }
    }
}

/// An article that was fetched but must not be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: Exclusion,
    pub url: String,
    /// Known once time extraction has run
    pub update_time: Option<DateTime<Utc>>,
}

/// Outcome of assembling one URL that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    Done(Article),
    Rejected(Rejection),
}

impl Assembly {
    pub fn article(&self) -> Option<&Article> {
        match self {
            Self::Done(article) => Some(article),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Done(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

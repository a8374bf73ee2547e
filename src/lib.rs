//! udn-harvest: a news article harvester for udn.com
//!
//! This crate discovers article links on the site's listing pages, fetches
//! each article, extracts a normalized body from whichever section template
//! the article uses, filters stale, paywalled and off-topic items, and stores
//! the formatted result in SQLite for listing and searching.

pub mod article;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for harvester operations
///
/// Exclusions (off-topic, paywalled, stale) are not errors; they are reported
/// through [`article::Assembly::Rejected`].
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Fetch cancelled for {url}")]
    Cancelled { url: String },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },

    #[error("No <title> element in {url}")]
    MissingTitle { url: String },

    #[error("Failed to render article node for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Failed to translate {url}: {source}")]
    Translate {
        url: String,
        #[source]
        source: article::TranslateError,
    },

    #[error("Invalid state transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: state::AssemblyState,
        to: state::AssemblyState,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if this error only affects the URL it was raised for
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Cancelled { .. } | Self::InvalidUrl { .. }
        )
    }
}

/// Transport-level failures for a single request
#[derive(Debug, Error)]
pub enum FetchError {
    /// The deadline elapsed or the server answered 404
    #[error("404 not found")]
    NotFound,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Malformed response")]
    Malformed,

    #[error("{0}")]
    Transport(#[source] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{Article, Assembly, Exclusion, Rejection};
pub use config::Config;
pub use state::AssemblyState;

//! Configuration module for udn-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use udn_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("udn.toml")).unwrap();
//! println!("Harvesting {} with {} workers", config.site.domain, config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DiscoveryConfig, FilterConfig, OutputConfig, SiteConfig,
    TranslateConfig, UserAgentConfig, DEFAULT_TIMEOUT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::article::translate::converter_for;
use crate::config::types::{
    Config, CrawlerConfig, DiscoveryConfig, FilterConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_discovery_config(&config.discovery)?;
    validate_filter_config(&config.filters)?;
    converter_for(&config.translate)
        .map_err(|e| ConfigError::Validation(format!("translate.target: {}", e)))?;
    Ok(())
}

/// Validates site metadata
///
/// An unparseable timeout falls back to one minute when used.
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.title.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site title cannot be empty".to_string(),
        ));
    }

    validate_domain_string(&config.domain)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.max_index_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_index_pages must be >= 1, got {}",
            config.max_index_pages
        )));
    }

    if config.freshness_days < 1 {
        return Err(ConfigError::Validation(format!(
            "freshness_days must be >= 1, got {}",
            config.freshness_days
        )));
    }

    humantime::parse_duration(&config.interval).map_err(|e| {
        ConfigError::Validation(format!("Invalid interval '{}': {}", config.interval, e))
    })?;

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates index URLs and the article link pattern
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.index_urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one index URL is required".to_string(),
        ));
    }

    for index in &config.index_urls {
        let url = Url::parse(index).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid index URL '{}': {}", index, e))
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::Validation(format!(
                "Index URL '{}' must use HTTP or HTTPS",
                index
            )));
        }
    }

    Regex::new(&config.article_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!(
            "Invalid article pattern '{}': {}",
            config.article_pattern, e
        ))
    })?;

    Ok(())
}

/// Rejects empty entries, which would match every title or URL
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    let lists = [
        ("ignore-categories", &config.ignore_categories),
        ("title-suffixes", &config.title_suffixes),
        ("ignore-domains", &config.ignore_domains),
        ("paywall-markers", &config.paywall_markers),
    ];

    for (name, entries) in lists {
        if entries.iter().any(|entry| entry.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot contain empty entries",
                name
            )));
        }
    }

    Ok(())
}

/// Validates a bare domain string
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'udn.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

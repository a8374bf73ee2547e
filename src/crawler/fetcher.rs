//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - The bounded, cancellable single round trip ("dial")
//! - Error classification (deadline, status, malformed headers)

use crate::config::{Config, UserAgentConfig};
use crate::{FetchError, HarvestError};
use reqwest::{redirect::Policy, Client, StatusCode};
use scraper::Html;
use std::error::Error as StdError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A successfully fetched page
///
/// Only the raw body is kept; [`FetchedPage::document`] parses it on demand
/// so no parsed tree is ever held across an await point.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Final URL after redirects
    pub final_url: Url,
    /// Page body
    pub raw: String,
}

impl FetchedPage {
    pub fn document(&self) -> Html {
        Html::parse_document(&self.raw)
    }

    /// Scheme, host and port of the final URL, e.g. `https://udn.com`
    pub fn origin(&self) -> String {
        self.final_url.origin().ascii_serialization()
    }
}

/// Result of a dial that reached the host
#[derive(Debug)]
pub enum Dialed {
    Page(FetchedPage),
    /// The server answered with headers that could not be parsed
    Malformed,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Deadline for a whole request, body included
///
/// # Example
///
/// ```no_run
/// use udn_harvest::config::UserAgentConfig;
/// use udn_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "UdnHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(60)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(1))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Shared, cancellable HTTP access
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(client: Client, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    /// Builds a fetcher from the user agent and site timeout settings
    pub fn from_config(
        config: &Config,
        cancel: CancellationToken,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.site.timeout())?;
        Ok(Self::new(client, cancel))
    }

    /// Fetches `url` in one bounded round trip
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Token cancelled | `HarvestError::Cancelled` |
    /// | Deadline exceeded | `FetchError::NotFound` |
    /// | HTTP 404 | `FetchError::NotFound` |
    /// | Other non-2xx | `FetchError::Status` |
    /// | Unparseable response header | `Ok(Dialed::Malformed)` |
    /// | Anything else | `FetchError::Transport` |
    pub async fn dial(&self, url: &str) -> Result<Dialed, HarvestError> {
        let parsed = Url::parse(url).map_err(|source| HarvestError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(HarvestError::Cancelled { url: url.to_string() }),
            result = self.round_trip(url, parsed) => result,
        }
    }

    async fn round_trip(&self, url: &str, parsed: Url) -> Result<Dialed, HarvestError> {
        let response = match self.client.get(parsed).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(url, e),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(fetch_error(url, FetchError::NotFound));
        }
        if !status.is_success() {
            return Err(fetch_error(url, FetchError::Status(status.as_u16())));
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(raw) => Ok(Dialed::Page(FetchedPage {
                url: url.to_string(),
                final_url,
                raw,
            })),
            Err(e) => classify_error(url, e),
        }
    }
}

fn fetch_error(url: &str, source: FetchError) -> HarvestError {
    HarvestError::Fetch {
        url: url.to_string(),
        source,
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> Result<Dialed, HarvestError> {
    if error.is_timeout() {
        return Err(fetch_error(url, FetchError::NotFound));
    }
    if is_malformed_header(&error) {
        return Ok(Dialed::Malformed);
    }
    Err(fetch_error(url, FetchError::Transport(error)))
}

/// Walks the error chain looking for a header parse failure
fn is_malformed_header(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if is_malformed_message(&e.to_string()) {
            return true;
        }
        current = e.source();
    }
    false
}

fn is_malformed_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("header") && (message.contains("invalid") || message.contains("too large"))
}

//! Per-URL assembly: dial, title, time, content, translation
//!
//! Each stage is recorded as an [`AssemblyState`] transition and traced at
//! debug level. Content is always extracted last, since it may trigger a
//! second fetch.

use crate::article::format::format_content;
use crate::article::time::fetch_update_time;
use crate::article::title::fetch_title;
use crate::article::translate::{converter_for, ScriptConverter};
use crate::article::{article_id, Article, Assembly, Exclusion, Rejection, Screened};
use crate::config::Config;
use crate::crawler::{Dialed, Fetcher};
use crate::extract::{extract_content, ExtractorRegistry};
use crate::state::AssemblyState;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Tracks one URL through the assembly states
struct Progress<'a> {
    url: &'a str,
    state: AssemblyState,
}

impl<'a> Progress<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            state: AssemblyState::Dialing,
        }
    }

    fn advance(&mut self, to: AssemblyState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                url: self.url.to_string(),
                from: self.state,
                to,
            });
        }
        debug!(url = self.url, from = %self.state, to = %to, "assembly transition");
        self.state = to;
        Ok(())
    }

    fn reject(
        &mut self,
        reason: Exclusion,
        update_time: Option<DateTime<Utc>>,
    ) -> Result<Assembly, HarvestError> {
        self.advance(AssemblyState::Rejected)?;
        info!(
            url = self.url,
            %reason,
            update_time = ?update_time,
            "article rejected"
        );
        Ok(Assembly::Rejected(Rejection {
            reason,
            url: self.url.to_string(),
            update_time,
        }))
    }

    fn fail(&mut self, error: &HarvestError) {
        if self.state.can_transition_to(AssemblyState::Failed) {
            debug!(url = self.url, from = %self.state, %error, "assembly failed");
            self.state = AssemblyState::Failed;
        }
    }
}

/// Turns article URLs into [`Assembly`] outcomes
///
/// Cheap to share: all fields are reference counted or cloneable handles.
#[derive(Clone)]
pub struct Assembler {
    config: Arc<Config>,
    fetcher: Fetcher,
    registry: Arc<ExtractorRegistry>,
    converter: Arc<dyn ScriptConverter>,
}

impl Assembler {
    /// Builds an assembler with the default section extractors and the
    /// configured script converter
    pub fn new(config: Arc<Config>, fetcher: Fetcher) -> Result<Self, HarvestError> {
        let converter = converter_for(&config.translate).map_err(|e| {
            HarvestError::Config(crate::ConfigError::Validation(format!(
                "translate.target: {}",
                e
            )))
        })?;

        Ok(Self::with_parts(
            config,
            fetcher,
            ExtractorRegistry::default(),
            Arc::from(converter),
        ))
    }

    pub fn with_parts(
        config: Arc<Config>,
        fetcher: Fetcher,
        registry: ExtractorRegistry,
        converter: Arc<dyn ScriptConverter>,
    ) -> Self {
        Self {
            config,
            fetcher,
            registry: Arc::new(registry),
            converter,
        }
    }

    /// Assembles the article at `raw_url`
    ///
    /// # Returns
    ///
    /// * `Ok(Assembly::Done(_))` - The article is ready to store
    /// * `Ok(Assembly::Rejected(_))` - Off-topic, paywalled or stale
    /// * `Err(HarvestError)` - The article could not be assembled
    pub async fn assemble(&self, raw_url: &str) -> Result<Assembly, HarvestError> {
        let mut progress = Progress::new(raw_url);
        match self.run(raw_url, &mut progress).await {
            Ok(assembly) => Ok(assembly),
            Err(e) => {
                progress.fail(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        raw_url: &str,
        progress: &mut Progress<'_>,
    ) -> Result<Assembly, HarvestError> {
        let page = match self.fetcher.dial(raw_url).await? {
            Dialed::Page(page) => page,
            Dialed::Malformed => return self.stub(raw_url, progress),
        };

        progress.advance(AssemblyState::TitleExtraction)?;
        let title = {
            let document = page.document();
            fetch_title(&document, &self.config.filters)
        };
        let title = match title {
            Some(Screened::Kept(title)) => title,
            Some(Screened::Excluded(_, reason)) => return progress.reject(reason, None),
            None => {
                return Err(HarvestError::MissingTitle {
                    url: raw_url.to_string(),
                })
            }
        };

        progress.advance(AssemblyState::TimeExtraction)?;
        let update_time = match fetch_update_time(
            &page.raw,
            Utc::now(),
            self.config.crawler.freshness_window(),
        ) {
            Screened::Kept(time) => time,
            Screened::Excluded(time, reason) => return progress.reject(reason, Some(time)),
        };

        progress.advance(AssemblyState::ContentExtraction)?;
        let body = match extract_content(
            &page,
            &self.fetcher,
            &self.config.filters,
            &self.registry,
        )
        .await?
        {
            Screened::Kept(body) => body,
            Screened::Excluded(_, reason) => return progress.reject(reason, Some(update_time)),
        };

        progress.advance(AssemblyState::Translation)?;
        let content = format_content(&title, update_time, &self.config.site, raw_url, &body);
        let content = self
            .converter
            .convert(&content)
            .map_err(|source| HarvestError::Translate {
                url: raw_url.to_string(),
                source,
            })?;

        progress.advance(AssemblyState::Done)?;
        Ok(Assembly::Done(self.article(raw_url, title, content, update_time)))
    }

    /// Stands in for a page whose response headers could not be parsed
    ///
    /// The title is the URL path, the time is now and the body is empty.
    fn stub(&self, raw_url: &str, progress: &mut Progress<'_>) -> Result<Assembly, HarvestError> {
        let url = Url::parse(raw_url).map_err(|source| HarvestError::InvalidUrl {
            url: raw_url.to_string(),
            source,
        })?;
        warn!(url = raw_url, "malformed response, storing a stub article");

        let title = url.path().to_string();
        let update_time = Utc::now();
        let content = format_content(&title, update_time, &self.config.site, raw_url, "");

        while let Some(next) = progress.state.next() {
            progress.advance(next)?;
        }

        Ok(Assembly::Done(self.article(raw_url, title, content, update_time)))
    }

    fn article(
        &self,
        raw_url: &str,
        title: String,
        content: String,
        update_time: DateTime<Utc>,
    ) -> Article {
        Article {
            id: article_id(raw_url),
            title,
            content,
            website_id: self.config.site.website_id(),
            website_domain: self.config.site.domain.clone(),
            website_title: self.config.site.title.clone(),
            update_time,
            source_url: raw_url.to_string(),
        }
    }
}

//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates one or more crawl
//! cycles, including:
//! - Recording each cycle in the run history
//! - Discovering article links from the index pages
//! - Assembling articles concurrently
//! - Storing finished articles and counting every other outcome
//! - Stopping cleanly on cancellation

use crate::article::{Assembler, Assembly};
use crate::config::Config;
use crate::crawler::discovery::LinkDiscovery;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::stats::CrawlStats;
use crate::storage::{
    open_storage, ArticleStorage, RunStatus, SqliteStorage, StorageError, StorageResult,
};
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    discovery: LinkDiscovery,
    assembler: Assembler,
    cancel: CancellationToken,
    config_hash: String,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `config_hash` - Hash of the configuration file, recorded per run
    /// * `cancel` - Token that stops fetching and the cycle loop
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to open storage or build the client
    pub fn new(
        config: Config,
        config_hash: String,
        cancel: CancellationToken,
    ) -> Result<Self, HarvestError> {
        let storage = open_storage(Path::new(&config.output.database_path))?;
        Self::with_storage(config, config_hash, storage, cancel)
    }

    /// Creates a coordinator over an already opened storage
    pub fn with_storage(
        config: Config,
        config_hash: String,
        storage: SqliteStorage,
        cancel: CancellationToken,
    ) -> Result<Self, HarvestError> {
        let config = Arc::new(config);
        let fetcher = Fetcher::from_config(&config, cancel.clone())?;
        let discovery = LinkDiscovery::new(fetcher.clone(), &config.discovery, &config.crawler)?;
        let assembler = Assembler::new(Arc::clone(&config), fetcher)?;

        Ok(Self {
            config,
            storage: Arc::new(Mutex::new(storage)),
            discovery,
            assembler,
            cancel,
            config_hash,
        })
    }

    /// Shared handle to the article store
    pub fn storage(&self) -> Arc<Mutex<SqliteStorage>> {
        Arc::clone(&self.storage)
    }

    fn with_storage_lock<T>(
        &self,
        f: impl FnOnce(&mut SqliteStorage) -> StorageResult<T>,
    ) -> Result<T, HarvestError> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))?;
        Ok(f(&mut storage)?)
    }

    /// Runs one crawl cycle
    ///
    /// 1. Record the run
    /// 2. Discover article links from every index URL
    /// 3. Assemble up to `workers` articles at a time
    /// 4. Store finished articles, count rejections and failures
    /// 5. Record the counters on the run
    pub async fn run_cycle(&self) -> Result<CrawlStats, HarvestError> {
        let run_id = self.with_storage_lock(|storage| storage.create_run(&self.config_hash))?;
        info!("Starting crawl cycle {}", run_id);

        let links = self
            .discovery
            .discover_all(&self.config.discovery.index_urls)
            .await;

        let mut stats = CrawlStats {
            discovered: links.len() as u64,
            ..Default::default()
        };
        info!("Cycle {}: {} article links to process", run_id, links.len());

        let workers = self.config.crawler.workers.max(1) as usize;
        let assembler = &self.assembler;
        let mut outcomes = stream::iter(links.iter())
            .map(|url| async move { (url, assembler.assemble(url.as_str()).await) })
            .buffer_unordered(workers);

        while let Some((url, outcome)) = outcomes.next().await {
            match outcome {
                Ok(Assembly::Done(article)) => {
                    match self.with_storage_lock(|storage| storage.put(&article)) {
                        Ok(()) => {
                            stats.stored += 1;
                            info!(
                                url = %url,
                                id = %article.id,
                                title = %article.title,
                                "article stored"
                            );
                        }
                        Err(e) => {
                            stats.failed += 1;
                            error!(url = %url, error = %e, "failed to store article");
                        }
                    }
                }
                Ok(Assembly::Rejected(rejection)) => stats.record_rejection(rejection.reason),
                Err(HarvestError::Cancelled { .. }) => stats.cancelled += 1,
                Err(e) if e.is_skippable() => {
                    stats.failed += 1;
                    warn!(url = %url, error = %e, "article skipped");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(url = %url, error = %e, "article failed");
                }
            }
        }

        let status = if self.cancel.is_cancelled() {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        self.with_storage_lock(|storage| storage.finish_run(run_id, status, &stats))?;

        info!("Cycle {} {}: {}", run_id, status.to_db_string(), stats);
        Ok(stats)
    }

    /// Runs crawl cycles until cancelled, or a single cycle if `once`
    ///
    /// Returns the counters of the last cycle.
    pub async fn run(&self, once: bool) -> Result<CrawlStats, HarvestError> {
        loop {
            let stats = self.run_cycle().await?;

            if once || self.cancel.is_cancelled() {
                return Ok(stats);
            }

            let interval = self.config.crawler.interval();
            info!(
                "Next crawl cycle in {}",
                humantime::format_duration(interval)
            );

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Crawl cancelled while waiting for the next cycle");
                    return Ok(stats);
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `config_hash` - Hash of the configuration file
/// * `cancel` - Token fired on shutdown
/// * `once` - Run a single cycle instead of looping
///
/// # Example
///
/// ```no_run
/// use udn_harvest::config::load_config_with_hash;
/// use udn_harvest::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("udn.toml"))?;
/// run_crawl(config, hash, CancellationToken::new(), true).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: String,
    cancel: CancellationToken,
    once: bool,
) -> Result<CrawlStats, HarvestError> {
    let coordinator = Coordinator::new(config, config_hash, cancel)?;
    coordinator.run(once).await
}

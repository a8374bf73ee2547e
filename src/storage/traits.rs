//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::article::Article;
use crate::crawler::CrawlStats;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("No article with id: {0}")]
    ArticleNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article storage backends
///
/// Articles are keyed by id; writing an existing id replaces it.
pub trait ArticleStorage {
    // ===== Articles =====

    /// Inserts or replaces an article
    fn put(&mut self, article: &Article) -> StorageResult<()>;

    /// Gets an article by id
    fn get(&self, id: &str) -> StorageResult<Article>;

    /// All articles, newest update time first
    fn list(&self) -> StorageResult<Vec<Article>>;

    /// Number of stored articles
    fn count(&self) -> StorageResult<u64>;

    /// Articles matching any of `keywords`, in [`ArticleStorage::list`] order
    ///
    /// See [`matches_keyword`] for the matching rules. Each article appears
    /// at most once.
    fn search(&self, keywords: &[String]) -> StorageResult<Vec<Article>> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();

        Ok(self
            .list()?
            .into_iter()
            .filter(|article| {
                keywords
                    .iter()
                    .any(|keyword| matches_keyword(article, keyword))
            })
            .collect())
    }

    // ===== Run History =====

    /// Records the start of a crawl cycle
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the end of a crawl cycle with its counters
    fn finish_run(&mut self, run_id: i64, status: RunStatus, stats: &CrawlStats)
        -> StorageResult<()>;

    /// Gets a run by id
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// The most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}

/// Returns true if `article` matches an already normalized keyword
///
/// Ids match exactly; title, content, domain and site title match as a
/// case-insensitive substring.
pub fn matches_keyword(article: &Article, keyword: &str) -> bool {
    article.id == keyword
        || article.website_id == keyword
        || [
            &article.title,
            &article.content,
            &article.website_domain,
            &article.website_title,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(keyword))
}

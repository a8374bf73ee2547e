//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStorage
//! trait.

use crate::article::Article;
use crate::crawler::CrawlStats;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStorage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const ARTICLE_COLUMNS: &str = "id, title, content, website_id, website_domain, website_title, update_time, source_url";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, discovered, stored, ignored_category, ignored_vip, stale, failed, cancelled";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Sortable text form of a timestamp
fn to_db_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn from_db_time(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_article(row: &Row<'_>) -> rusqlite::Result<Article> {
    let update_time: String = row.get(6)?;
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        website_id: row.get(3)?,
        website_domain: row.get(4)?,
        website_title: row.get(5)?,
        update_time: from_db_time(6, &update_time)?,
        source_url: row.get(7)?,
    })
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let count = |idx: usize| -> rusqlite::Result<u64> { Ok(row.get::<_, i64>(idx)?.max(0) as u64) };

    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        stats: CrawlStats {
            discovered: count(5)?,
            stored: count(6)?,
            ignored_category: count(7)?,
            ignored_vip: count(8)?,
            stale: count(9)?,
            failed: count(10)?,
            cancelled: count(11)?,
        },
    })
}

fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl ArticleStorage for SqliteStorage {
    // ===== Articles =====

    fn put(&mut self, article: &Article) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO articles (id, title, content, website_id, website_domain, website_title, update_time, source_url, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                website_id = excluded.website_id,
                website_domain = excluded.website_domain,
                website_title = excluded.website_title,
                update_time = excluded.update_time,
                source_url = excluded.source_url,
                stored_at = excluded.stored_at",
            params![
                article.id,
                article.title,
                article.content,
                article.website_id,
                article.website_domain,
                article.website_title,
                to_db_time(&article.update_time),
                article.source_url,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Article> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS))?;

        stmt.query_row(params![id], row_to_article)
            .optional()?
            .ok_or_else(|| StorageError::ArticleNotFound(id.to_string()))
    }

    fn list(&self) -> StorageResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM articles ORDER BY update_time DESC, id ASC",
            ARTICLE_COLUMNS
        ))?;

        let articles = stmt
            .query_map([], row_to_article)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run History =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        stats: &CrawlStats,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, discovered = ?3, stored = ?4,
                ignored_category = ?5, ignored_vip = ?6, stale = ?7, failed = ?8, cancelled = ?9
             WHERE id = ?10",
            params![
                now,
                status.to_db_string(),
                to_db_count(stats.discovered),
                to_db_count(stats.stored),
                to_db_count(stats.ignored_category),
                to_db_count(stats.ignored_vip),
                to_db_count(stats.stale),
                to_db_count(stats.failed),
                to_db_count(stats.cancelled),
                run_id,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS))?;

        stmt.query_row(params![run_id], row_to_run)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let runs = stmt
            .query_map(params![limit], row_to_run)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}

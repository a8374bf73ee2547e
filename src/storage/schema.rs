//! SQLite schema for articles and crawl runs

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Harvested articles, keyed by the hash of their source URL
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    website_id TEXT NOT NULL,
    website_domain TEXT NOT NULL,
    website_title TEXT NOT NULL,
    update_time TEXT NOT NULL,
    source_url TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_update_time ON articles(update_time);
CREATE INDEX IF NOT EXISTS idx_articles_website ON articles(website_id);

-- One row per crawl cycle
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    discovered INTEGER NOT NULL DEFAULT 0,
    stored INTEGER NOT NULL DEFAULT 0,
    ignored_category INTEGER NOT NULL DEFAULT 0,
    ignored_vip INTEGER NOT NULL DEFAULT 0,
    stale INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    cancelled INTEGER NOT NULL DEFAULT 0
);
"#;

/// Creates any missing tables and indexes; safe to run on every open
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn count_objects(conn: &Connection, kind: &str, name: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_reopening_keeps_one_copy_of_each_table() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        assert_eq!(count_objects(&conn, "table", "articles"), 1);
        assert_eq!(count_objects(&conn, "table", "runs"), 1);
    }

    #[test]
    fn test_listing_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        assert_eq!(count_objects(&conn, "index", "idx_articles_update_time"), 1);
        assert_eq!(count_objects(&conn, "index", "idx_articles_website"), 1);
    }

    #[test]
    fn test_run_counters_default_to_zero() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES ('now', 'h', 'running')",
            [],
        )
        .unwrap();

        let stored: i64 = conn
            .query_row("SELECT stored + cancelled FROM runs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 0);
    }
}

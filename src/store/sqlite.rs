//! SQLite storage implementation

use crate::store::schema::initialize_schema;
use crate::store::{ArticleRecord, RunStatus, Store, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database at the given path
    pub fn new(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    fn exists(&self, url: &str, speaker: &str) -> StoreResult<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE url = ?1 AND speaker = ?2",
            params![url, speaker],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn find(&self, url: &str, speaker: &str) -> StoreResult<Option<ArticleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT search_keyword, source, url, speaker, country, title, body,
                    published_on, is_about, explanation
             FROM articles WHERE url = ?1 AND speaker = ?2",
        )?;

        let record = stmt
            .query_row(params![url, speaker], |row| {
                Ok(ArticleRecord {
                    search_keyword: row.get(0)?,
                    source: row.get(1)?,
                    url: row.get(2)?,
                    speaker: row.get(3)?,
                    country: row.get(4)?,
                    title: row.get(5)?,
                    body: row.get(6)?,
                    published_on: row.get(7)?,
                    is_about: row.get::<_, i64>(8)? != 0,
                    explanation: row.get(9)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    fn insert(&mut self, record: &ArticleRecord) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO articles
                (search_keyword, source, url, speaker, country, title, body,
                 published_on, is_about, explanation, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.search_keyword,
                record.source,
                record.url,
                record.speaker,
                record.country,
                record.title,
                record.body,
                record.published_on,
                record.is_about as i64,
                record.explanation,
                now,
            ],
        )?;
        Ok(())
    }

    fn create_run(&mut self, config_hash: &str) -> StoreResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2 WHERE id = ?3",
            params![now, status.to_db_string(), run_id],
        )?;
        Ok(())
    }

    fn count_articles(&self) -> StoreResult<u64> {
        let count: u64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count)
    }

    fn count_relevant(&self) -> StoreResult<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE is_about = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn source_counts(&self) -> StoreResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, COUNT(*) FROM articles GROUP BY source ORDER BY source",
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

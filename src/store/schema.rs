//! SQLite schema definition

use rusqlite::Connection;

/// Creates all tables and indexes if they do not exist
pub(crate) fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT,
            config_hash TEXT NOT NULL,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            search_keyword TEXT NOT NULL,
            source TEXT NOT NULL,
            url TEXT NOT NULL,
            speaker TEXT NOT NULL,
            country TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            published_on TEXT NOT NULL,
            is_about INTEGER NOT NULL,
            explanation TEXT NOT NULL,
            stored_at TEXT NOT NULL,
            UNIQUE (url, speaker)
        );

        CREATE INDEX IF NOT EXISTS idx_articles_source ON articles (source);
        CREATE INDEX IF NOT EXISTS idx_articles_published ON articles (published_on);
        ",
    )
}

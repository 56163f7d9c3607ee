//! Storage module for persisting crawl results
//!
//! This module defines the store contract the engine writes through,
//! including:
//! - Article records keyed by (url, speaker)
//! - Run tracking with config hashes
//! - A SQLite implementation

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One classified article, written at most once per (url, speaker) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub search_keyword: String,
    /// Source domain the article came from
    pub source: String,
    pub url: String,
    pub speaker: String,
    pub country: String,
    pub title: String,
    pub body: String,
    /// Canonical `YYYY-MM-DD` publication date
    pub published_on: String,
    /// Relevance verdict from the classifier
    pub is_about: bool,
    pub explanation: String,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Trait for storage backend implementations
///
/// The engine only ever talks to this trait; it is the authoritative
/// "already processed" signal across runs, independent of the exception
/// cache (the cache records processing failures and date rejections, the
/// store records successful ingestion).
pub trait Store {
    /// Checks whether a record exists for this (url, speaker) pair
    fn exists(&self, url: &str, speaker: &str) -> StoreResult<bool>;

    /// Finds a record by (url, speaker)
    fn find(&self, url: &str, speaker: &str) -> StoreResult<Option<ArticleRecord>>;

    /// Inserts a record; a second insert for the same (url, speaker) pair
    /// is a no-op
    fn insert(&mut self, record: &ArticleRecord) -> StoreResult<()>;

    // ===== Run Management =====

    /// Creates a new crawl run, returning its id
    fn create_run(&mut self, config_hash: &str) -> StoreResult<i64>;

    /// Marks a run finished with the given status
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StoreResult<()>;

    // ===== Statistics =====

    fn count_articles(&self) -> StoreResult<u64>;

    fn count_relevant(&self) -> StoreResult<u64>;

    /// Article counts grouped by source domain, sorted by domain
    fn source_counts(&self) -> StoreResult<Vec<(String, u64)>>;
}

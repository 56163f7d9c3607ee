//! Link ledger: de-duplication and exception-cache bookkeeping
//!
//! Three membership tests decide whether a link is fetched at all:
//! - the in-run seen set (guards against sources returning overlapping or
//!   duplicate pages within one crawl)
//! - the durable per-source exception cache (links that previously failed
//!   extraction or carried stale/unparseable dates)
//! - the external ingestion check against the store
//!
//! Any failing check short-circuits without performing I/O. A link in the
//! exception cache is never retried in this or future runs unless the
//! cache file is externally reset.

use crate::store::{Store, StoreResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from exception-cache persistence
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache file corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Per-source link bookkeeping for one crawl run
pub struct LinkLedger {
    seen: HashSet<String>,
    exceptions: HashSet<String>,
    cache_path: PathBuf,
}

impl LinkLedger {
    /// Opens the ledger for a source, loading its exception cache
    ///
    /// The cache file is `<cache_dir>/<source_id>.json`, a JSON array of
    /// URL strings; an empty file is created if absent.
    pub fn open(cache_dir: &Path, source_id: &str) -> Result<Self, LedgerError> {
        fs::create_dir_all(cache_dir)?;
        let cache_path = cache_dir.join(format!("{}.json", source_id));

        if !cache_path.exists() {
            fs::write(&cache_path, "[]")?;
        }

        let content = fs::read_to_string(&cache_path)?;
        let urls: Vec<String> = serde_json::from_str(&content)?;

        Ok(Self {
            seen: HashSet::new(),
            exceptions: urls.into_iter().collect(),
            cache_path,
        })
    }

    /// Clears the in-run seen set (called at the start of each keyword loop)
    pub fn begin_keyword(&mut self) {
        self.seen.clear();
    }

    pub fn seen_in_run(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn mark_seen(&mut self, url: &str) {
        self.seen.insert(url.to_string());
    }

    pub fn is_exception(&self, url: &str) -> bool {
        self.exceptions.contains(url)
    }

    pub fn add_exception(&mut self, url: &str) {
        self.exceptions.insert(url.to_string());
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// Runs all three admission checks for a link
    ///
    /// Returns false (drop the link) if it was already seen this run, sits
    /// in the exception cache, or is already ingested for any of the given
    /// speakers. For multi-speaker sources a record under any speaker marks
    /// the link processed (the at-least-one-record policy guarantees one
    /// exists).
    pub fn admit(&self, url: &str, speakers: &[String], store: &dyn Store) -> StoreResult<bool> {
        if self.seen_in_run(url) || self.is_exception(url) {
            return Ok(false);
        }

        for speaker in speakers {
            if store.exists(url, speaker)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Rewrites the exception-cache file
    ///
    /// Called unconditionally on run exit (success, error, or
    /// cancellation) so partial progress is never lost. Entries are sorted
    /// so the file is diff-stable.
    pub fn persist(&self) -> Result<(), LedgerError> {
        let mut urls: Vec<&String> = self.exceptions.iter().collect();
        urls.sort();
        let json = serde_json::to_string_pretty(&urls)?;
        fs::write(&self.cache_path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ArticleRecord, SqliteStore};
    use tempfile::TempDir;

    fn record(url: &str, speaker: &str) -> ArticleRecord {
        ArticleRecord {
            search_keyword: "غزة".to_string(),
            source: "https://example.com/".to_string(),
            url: url.to_string(),
            speaker: speaker.to_string(),
            country: "Bahrain".to_string(),
            title: "title".to_string(),
            body: "body".to_string(),
            published_on: "2024-01-15".to_string(),
            is_about: false,
            explanation: "".to_string(),
        }
    }

    #[test]
    fn test_open_creates_empty_cache_file() {
        let dir = TempDir::new().unwrap();
        let ledger = LinkLedger::open(dir.path(), "bna").unwrap();

        assert_eq!(ledger.exception_count(), 0);
        let content = fs::read_to_string(dir.path().join("bna.json")).unwrap();
        assert_eq!(content, "[]");
    }

    #[test]
    fn test_seen_set_resets_per_keyword() {
        let dir = TempDir::new().unwrap();
        let mut ledger = LinkLedger::open(dir.path(), "bna").unwrap();

        ledger.mark_seen("https://example.com/a");
        assert!(ledger.seen_in_run("https://example.com/a"));

        ledger.begin_keyword();
        assert!(!ledger.seen_in_run("https://example.com/a"));
    }

    #[test]
    fn test_exception_cache_survives_reload() {
        let dir = TempDir::new().unwrap();

        {
            let mut ledger = LinkLedger::open(dir.path(), "bna").unwrap();
            ledger.add_exception("https://example.com/stale");
            ledger.persist().unwrap();
        }

        // A URL cached in run N is excluded in run N+1
        let reloaded = LinkLedger::open(dir.path(), "bna").unwrap();
        assert!(reloaded.is_exception("https://example.com/stale"));
        assert_eq!(reloaded.exception_count(), 1);
    }

    #[test]
    fn test_persist_writes_sorted_array() {
        let dir = TempDir::new().unwrap();
        let mut ledger = LinkLedger::open(dir.path(), "bna").unwrap();

        ledger.add_exception("https://example.com/b");
        ledger.add_exception("https://example.com/a");
        ledger.persist().unwrap();

        let content = fs::read_to_string(dir.path().join("bna.json")).unwrap();
        let urls: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(
            urls,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_admit_rejects_seen_and_exception() {
        let dir = TempDir::new().unwrap();
        let mut ledger = LinkLedger::open(dir.path(), "bna").unwrap();
        let store = SqliteStore::new_in_memory().unwrap();
        let speakers = vec!["speaker".to_string()];

        assert!(ledger.admit("https://example.com/a", &speakers, &store).unwrap());

        ledger.mark_seen("https://example.com/a");
        assert!(!ledger.admit("https://example.com/a", &speakers, &store).unwrap());

        ledger.add_exception("https://example.com/b");
        assert!(!ledger.admit("https://example.com/b", &speakers, &store).unwrap());
    }

    #[test]
    fn test_admit_rejects_ingested_for_any_speaker() {
        let dir = TempDir::new().unwrap();
        let ledger = LinkLedger::open(dir.path(), "spa").unwrap();
        let mut store = SqliteStore::new_in_memory().unwrap();

        let speakers = vec!["first".to_string(), "second".to_string()];
        store.insert(&record("https://example.com/a", "second")).unwrap();

        assert!(!ledger.admit("https://example.com/a", &speakers, &store).unwrap());
        assert!(ledger.admit("https://example.com/other", &speakers, &store).unwrap());
    }

    #[test]
    fn test_corrupt_cache_file_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bna.json"), "not json").unwrap();

        let result = LinkLedger::open(dir.path(), "bna");
        assert!(matches!(result, Err(LedgerError::Corrupt(_))));
    }
}

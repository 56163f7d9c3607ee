//! Rasid: an incremental statement-watch crawler
//!
//! This crate implements a crawler that repeatedly searches official news
//! sources for a fixed set of keywords, extracts candidate articles newer
//! than a rolling cutoff date, and forwards each candidate to an external
//! classifier that decides whether a named speaker made a relevant
//! statement, persisting the results.

pub mod classify;
pub mod config;
pub mod dates;
pub mod engine;
pub mod fetch;
pub mod ledger;
pub mod sources;
pub mod store;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Main error type for Rasid operations
#[derive(Debug, Error)]
pub enum RasidError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Date error: {0}")]
    Date(#[from] dates::DateError),

    #[error("Extraction error: {0}")]
    Extract(#[from] engine::ExtractError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Exception cache error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown source id: {0}")]
    UnknownSource(String),
}

/// Result type alias for Rasid operations
pub type Result<T> = std::result::Result<T, RasidError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Cooperative cancellation flag shared across the engine.
///
/// The flag is checked between fetch retries, between pagination steps and
/// between links; setting it aborts the current source's loop without
/// corrupting the exception cache (the cache is flushed unconditionally on
/// exit).
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// Re-export commonly used types
pub use config::Config;
pub use dates::CutoffWindow;
pub use engine::CrawlEngine;
pub use store::ArticleRecord;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_shared_across_clones() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());

        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}

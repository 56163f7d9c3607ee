//! Run statistics
//!
//! Aggregated counters for one source or one whole run, reported in the
//! end-of-run summary log.

/// Counters collected while crawling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Search result pages fetched
    pub pages_fetched: u64,

    /// Candidate links extracted from result pages
    pub links_extracted: u64,

    /// Links dropped by ledger admission (seen, cached, or ingested)
    pub links_skipped: u64,

    /// Article pages fetched
    pub articles_fetched: u64,

    /// Records written to the store
    pub articles_stored: u64,

    /// Records stored with a positive verdict
    pub relevant: u64,

    /// Links rejected for stale or unresolvable dates
    pub too_old: u64,

    /// URLs newly added to the exception cache
    pub exceptions_added: u64,

    /// Per-link or per-keyword failures that were caught and logged
    pub errors: u64,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.pages_fetched += other.pages_fetched;
        self.links_extracted += other.links_extracted;
        self.links_skipped += other.links_skipped;
        self.articles_fetched += other.articles_fetched;
        self.articles_stored += other.articles_stored;
        self.relevant += other.relevant;
        self.too_old += other.too_old;
        self.exceptions_added += other.exceptions_added;
        self.errors += other.errors;
    }

    /// Logs a one-line summary for the given scope
    pub fn log_summary(&self, scope: &str) {
        tracing::info!(
            "{}: {} pages, {} links ({} skipped), {} articles fetched, \
             {} stored ({} relevant), {} too old, {} exceptions, {} errors",
            scope,
            self.pages_fetched,
            self.links_extracted,
            self.links_skipped,
            self.articles_fetched,
            self.articles_stored,
            self.relevant,
            self.too_old,
            self.exceptions_added,
            self.errors,
        );
    }
}

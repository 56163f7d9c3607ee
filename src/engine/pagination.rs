//! Pagination state machine
//!
//! Drives one (adapter, keyword) pair through its search result pages
//! until a terminal signal. The machine has two states, advancing and
//! terminated; every page step returns an explicit disposition that is
//! threaded through the loop rather than held as shared mutable flags.
//!
//! Termination paths:
//! - the page has no links
//! - the adapter raised its "no results" marker
//! - the page's link set equals the previous page's set (sites whose
//!   pagination parameter is ignored return the same page forever)
//! - a cutoff-exceeding article was encountered on a cutoff-sensitive
//!   adapter (results are assumed newest-first, so the rest is older)
//! - cancellation

use crate::engine::adapter::{SearchCursor, SourceAdapter};
use crate::engine::processor::ArticleProcessor;
use crate::engine::stats::RunStats;
use crate::fetch::Fetcher;
use crate::ledger::LinkLedger;
use crate::{CancelFlag, RasidError};
use std::collections::BTreeSet;
use std::fmt;

/// Why pagination stopped for one keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The result page carried no links
    EmptyPage,

    /// The adapter's terminal marker was present
    NoMoreResults,

    /// The page repeated the previous page's link set
    DuplicatePage,

    /// Every link on the page was filtered by the ledger; everything
    /// older is already known
    NoFreshLinks,

    /// The newest remaining articles are older than the cutoff window
    CutoffReached,

    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyPage => "empty page",
            Self::NoMoreResults => "no-more marker",
            Self::DuplicatePage => "duplicate page",
            Self::NoFreshLinks => "no fresh links",
            Self::CutoffReached => "cutoff reached",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", text)
    }
}

/// Result of driving one keyword to termination
#[derive(Debug, Clone, Copy)]
pub struct KeywordOutcome {
    pub pages: u32,
    pub stop: StopReason,
}

/// The per-keyword pagination driver
///
/// Re-instantiated state (cursor, previous page set, in-run seen set) is
/// fresh for every keyword.
pub struct PaginationDriver<'a> {
    adapter: &'a dyn SourceAdapter,
    fetcher: &'a Fetcher,
    cancel: CancelFlag,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(adapter: &'a dyn SourceAdapter, fetcher: &'a Fetcher, cancel: CancelFlag) -> Self {
        Self {
            adapter,
            fetcher,
            cancel,
        }
    }

    /// Drives one keyword until termination
    ///
    /// Errors from fetching or parsing a page propagate to the caller,
    /// which confines them to this keyword's scope.
    pub async fn run_keyword(
        &self,
        keyword: &str,
        ledger: &mut LinkLedger,
        processor: &mut ArticleProcessor<'_>,
        stats: &mut RunStats,
    ) -> Result<KeywordOutcome, RasidError> {
        ledger.begin_keyword();

        let mut cursor = SearchCursor::new(
            keyword,
            self.adapter.first_position(),
            self.adapter.step(),
        );
        let mut previous: Option<BTreeSet<String>> = None;
        let mut pages = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(KeywordOutcome {
                    pages,
                    stop: StopReason::Cancelled,
                });
            }

            let request = self.adapter.search_request(&cursor);
            let raw = self
                .fetcher
                .fetch(&request, self.adapter.fetch_policy())
                .await?;
            stats.pages_fetched += 1;
            pages += 1;

            let page = self.adapter.parse_result_page(&raw, keyword)?;
            stats.links_extracted += page.links.len() as u64;

            if page.links.is_empty() {
                return Ok(KeywordOutcome {
                    pages,
                    stop: StopReason::EmptyPage,
                });
            }

            // Compare the raw link set against the previous page before any
            // filtering; an identical page means the pagination parameter
            // is being ignored.
            let current: BTreeSet<String> =
                page.links.iter().map(|link| link.url.clone()).collect();
            if previous.as_ref() == Some(&current) {
                return Ok(KeywordOutcome {
                    pages,
                    stop: StopReason::DuplicatePage,
                });
            }
            previous = Some(current);

            let outcome = processor.process_page(&page, ledger, stats).await?;

            if self.adapter.cutoff_sensitive() && outcome.cutoff_hit {
                return Ok(KeywordOutcome {
                    pages,
                    stop: StopReason::CutoffReached,
                });
            }

            if outcome.fresh == 0 {
                return Ok(KeywordOutcome {
                    pages,
                    stop: StopReason::NoFreshLinks,
                });
            }

            if page.no_more {
                return Ok(KeywordOutcome {
                    pages,
                    stop: StopReason::NoMoreResults,
                });
            }

            cursor.advance();
        }
    }
}

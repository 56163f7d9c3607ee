//! The site adapter contract
//!
//! One adapter exists per crawled source. Adapters only translate between
//! the engine and one site's HTML/JSON shape: building search requests,
//! parsing result lists, and extracting article fields. All pagination,
//! retry, de-duplication and cutoff logic lives in the engine, which
//! depends only on this trait.

use crate::classify::Language;
use crate::dates::DateHint;
use crate::fetch::{FetchPolicy, HeaderProfile, RequestSpec};
use chrono::NaiveDate;
use thiserror::Error;

/// A field or selector the adapter expected was missing from the page
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExtractError(pub String);

impl ExtractError {
    pub fn missing(what: &str) -> Self {
        Self(format!("missing {}", what))
    }
}

/// Result type for adapter extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Immutable identity of one crawled source
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// Stable id; also names the exception-cache file
    pub id: String,

    /// Base URL, stored as the record's source and used to resolve links
    pub domain: String,

    pub country: String,

    /// Speakers watched on this source, in fixed order
    pub speakers: Vec<String>,

    /// Language articles are written in
    pub language: Language,

    /// Relax TLS verification for this source
    pub accept_invalid_certs: bool,
}

impl CrawlTarget {
    /// The first speaker; receives the processed-marker record when no
    /// speaker is found relevant
    pub fn primary_speaker(&self) -> &str {
        &self.speakers[0]
    }
}

/// Cursor into one keyword's paginated search results
///
/// Position semantics are adapter-defined (page number, row offset, or
/// skip count) but always advance monotonically by `step`.
#[derive(Debug, Clone)]
pub struct SearchCursor {
    pub keyword: String,
    pub position: u64,
    pub step: u64,
}

impl SearchCursor {
    pub fn new(keyword: &str, position: u64, step: u64) -> Self {
        Self {
            keyword: keyword.to_string(),
            position,
            step,
        }
    }

    pub fn advance(&mut self) {
        self.position += self.step;
    }
}

/// One link extracted from a result page
#[derive(Debug, Clone)]
pub struct CandidateLink {
    pub url: String,

    /// Publish date when the result list already carries one
    pub published: Option<NaiveDate>,

    /// The keyword whose search surfaced this link
    pub keyword: String,
}

/// One parsed page of search results
#[derive(Debug, Clone, Default)]
pub struct ResultPage {
    pub links: Vec<CandidateLink>,

    /// Adapter-specific terminal marker ("no results", pagination
    /// disabled); the current page's links are still processed
    pub no_more: bool,
}

/// Structured fields extracted from one article page
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub body: String,

    /// Raw date text as it appeared on the page, if any
    pub raw_date: Option<String>,
}

/// The contract every source implements
pub trait SourceAdapter: Send + Sync {
    fn target(&self) -> &CrawlTarget;

    /// Builds the search request for one page of one keyword
    fn search_request(&self, cursor: &SearchCursor) -> RequestSpec;

    /// Parses one page of search results
    fn parse_result_page(&self, raw: &str, keyword: &str) -> ExtractResult<ResultPage>;

    /// Extracts structured fields from an article page
    fn parse_article(&self, raw: &str, url: &str) -> ExtractResult<ArticleDraft>;

    /// Builds the request used to fetch one article page
    fn article_request(&self, url: &str) -> RequestSpec {
        RequestSpec::get(url).with_headers(HeaderProfile::Browser)
    }

    /// First cursor position for a fresh keyword
    fn first_position(&self) -> u64 {
        1
    }

    /// Cursor increment per page
    fn step(&self) -> u64 {
        1
    }

    fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy::ProxiedOnly
    }

    /// Whether results are sorted newest-first, making a cutoff-exceeding
    /// item a safe termination signal
    fn cutoff_sensitive(&self) -> bool {
        true
    }

    /// Hint for parsing this source's raw date strings
    fn date_hint(&self) -> DateHint {
        DateHint::Unspecified
    }
}

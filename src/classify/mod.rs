//! Relevance classification
//!
//! The classifier decides whether a named speaker personally made a
//! relevant statement in an article. It is an external collaborator: the
//! engine only knows this trait. Implementations must fail closed: any
//! internal error becomes a negative verdict, never a propagated error, so
//! a flaky classifier cannot abort a crawl.

mod http;

pub use http::HttpClassifier;

use async_trait::async_trait;

/// Article language, used to pick the keyword list and prompt wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::English => "en",
        }
    }
}

/// The classifier's decision for one (speaker, article) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_about: bool,
    pub explanation: String,
}

impl Verdict {
    /// The fail-closed verdict used when classification cannot complete
    pub fn negative(reason: &str) -> Self {
        Self {
            is_about: false,
            explanation: reason.to_string(),
        }
    }
}

/// External relevance classifier contract
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Judges whether the speaker made a relevant statement in the article.
    ///
    /// Infallible by design: implementations map every internal error to
    /// `Verdict::negative`.
    async fn classify(&self, speaker: &str, title: &str, body: &str, language: Language)
        -> Verdict;
}

//! Article processing pipeline
//!
//! For each candidate link surviving ledger admission: fetch the article
//! page, extract structured fields, resolve and validate the publish
//! date, classify per speaker, and write records. A failure on one link
//! is caught and logged; the batch always continues.

use crate::classify::Classifier;
use crate::dates::{resolve_article_date, CutoffWindow};
use crate::engine::adapter::{ArticleDraft, CandidateLink, ResultPage, SourceAdapter};
use crate::engine::stats::RunStats;
use crate::fetch::Fetcher;
use crate::ledger::LinkLedger;
use crate::store::{ArticleRecord, Store};
use crate::{CancelFlag, RasidError};
use chrono::NaiveDate;

/// Aggregate result of processing one page of links
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOutcome {
    /// At least one article on this page was older than the cutoff
    pub cutoff_hit: bool,

    /// Links that survived ledger admission (advancing past a page
    /// requires at least one)
    pub fresh: usize,
}

/// What happened to a single link
enum LinkResult {
    /// Dropped by ledger admission without any I/O
    Skipped,

    /// Date was stale or unresolvable; link cached as an exception
    TooOld { crossed_cutoff: bool },

    /// Classified and recorded
    Processed,
}

/// Processes candidate links for one source
pub struct ArticleProcessor<'a> {
    adapter: &'a dyn SourceAdapter,
    fetcher: &'a Fetcher,
    classifier: &'a dyn Classifier,
    store: &'a mut dyn Store,
    window: CutoffWindow,
    cancel: CancelFlag,
}

impl<'a> ArticleProcessor<'a> {
    pub fn new(
        adapter: &'a dyn SourceAdapter,
        fetcher: &'a Fetcher,
        classifier: &'a dyn Classifier,
        store: &'a mut dyn Store,
        window: CutoffWindow,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            classifier,
            store,
            window,
            cancel,
        }
    }

    /// Processes every link on one result page
    pub async fn process_page(
        &mut self,
        page: &ResultPage,
        ledger: &mut LinkLedger,
        stats: &mut RunStats,
    ) -> Result<ProcessOutcome, RasidError> {
        let mut outcome = ProcessOutcome::default();

        for link in &page.links {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.process_link(link, ledger, stats).await {
                Ok(LinkResult::Skipped) => {
                    stats.links_skipped += 1;
                }
                Ok(LinkResult::TooOld { crossed_cutoff }) => {
                    outcome.fresh += 1;
                    stats.too_old += 1;
                    stats.exceptions_added += 1;
                    if crossed_cutoff {
                        outcome.cutoff_hit = true;
                    }
                }
                Ok(LinkResult::Processed) => {
                    outcome.fresh += 1;
                }
                Err(error) => {
                    outcome.fresh += 1;
                    stats.errors += 1;
                    // Extraction failures are permanent for the link and go
                    // to the cache; exhausted fetches stay retryable in
                    // future runs
                    if matches!(error, RasidError::Extract(_)) {
                        ledger.add_exception(&link.url);
                        stats.exceptions_added += 1;
                    }
                    tracing::warn!("Failed to process {}: {}", link.url, error);
                }
            }
        }

        Ok(outcome)
    }

    /// Runs the full pipeline for one link
    async fn process_link(
        &mut self,
        link: &CandidateLink,
        ledger: &mut LinkLedger,
        stats: &mut RunStats,
    ) -> Result<LinkResult, RasidError> {
        let target = self.adapter.target();

        let admitted = ledger.admit(&link.url, &target.speakers, &*self.store)?;
        ledger.mark_seen(&link.url);
        if !admitted {
            return Ok(LinkResult::Skipped);
        }

        // Pre-extracted dates short-circuit before the article fetch
        if let Some(date) = link.published {
            if !self.window.is_plausible(date) {
                ledger.add_exception(&link.url);
                return Ok(LinkResult::TooOld {
                    crossed_cutoff: false,
                });
            }
            if self.window.is_before_cutoff(date) {
                ledger.add_exception(&link.url);
                return Ok(LinkResult::TooOld {
                    crossed_cutoff: true,
                });
            }
        }

        let request = self.adapter.article_request(&link.url);
        let raw = self
            .fetcher
            .fetch(&request, self.adapter.fetch_policy())
            .await?;
        stats.articles_fetched += 1;

        let draft = self.adapter.parse_article(&raw, &link.url)?;

        let date = match link.published {
            Some(date) => date,
            None => {
                match resolve_article_date(
                    draft.raw_date.as_deref(),
                    &draft.body,
                    &link.url,
                    self.adapter.date_hint(),
                ) {
                    Ok(date) if self.window.is_plausible(date) => date,
                    // Unparseable or implausible dates fail safe to "too
                    // old" without signalling a cutoff crossing
                    _ => {
                        ledger.add_exception(&link.url);
                        return Ok(LinkResult::TooOld {
                            crossed_cutoff: false,
                        });
                    }
                }
            }
        };

        if self.window.is_before_cutoff(date) {
            ledger.add_exception(&link.url);
            return Ok(LinkResult::TooOld {
                crossed_cutoff: true,
            });
        }

        self.classify_and_store(link, &draft, date, stats).await?;
        Ok(LinkResult::Processed)
    }

    /// Classifies the article per speaker and writes records
    ///
    /// Speakers are iterated in fixed order. Every speaker with a positive
    /// verdict gets a record labeled with that speaker; if none is found
    /// relevant, the first speaker's negative record is written anyway so
    /// the link is marked processed for future ingestion checks.
    async fn classify_and_store(
        &mut self,
        link: &CandidateLink,
        draft: &ArticleDraft,
        date: NaiveDate,
        stats: &mut RunStats,
    ) -> Result<(), RasidError> {
        let target = self.adapter.target();
        let mut any_positive = false;
        let mut first_negative: Option<ArticleRecord> = None;

        for (index, speaker) in target.speakers.iter().enumerate() {
            if self.store.exists(&link.url, speaker)? {
                continue;
            }

            let verdict = self
                .classifier
                .classify(speaker, &draft.title, &draft.body, target.language)
                .await;

            let record = ArticleRecord {
                search_keyword: link.keyword.clone(),
                source: target.domain.clone(),
                url: link.url.clone(),
                speaker: speaker.clone(),
                country: target.country.clone(),
                title: draft.title.clone(),
                body: draft.body.clone(),
                published_on: date.format("%Y-%m-%d").to_string(),
                is_about: verdict.is_about,
                explanation: verdict.explanation,
            };

            if verdict.is_about {
                self.store.insert(&record)?;
                stats.articles_stored += 1;
                stats.relevant += 1;
                any_positive = true;
            } else if index == 0 {
                first_negative = Some(record);
            }
        }

        if !any_positive {
            if let Some(record) = first_negative {
                self.store.insert(&record)?;
                stats.articles_stored += 1;
            }
        }

        Ok(())
    }
}

//! Crawl engine runner
//!
//! Iterates sources and keywords, confining every failure to its own
//! scope: a bad link never aborts its page, a bad keyword never aborts
//! its source, and a bad source never aborts the run. Each source's
//! exception cache is flushed unconditionally when the source's loop
//! exits, whether on success, error, or cancellation.

use crate::classify::{Classifier, Language};
use crate::config::Config;
use crate::dates::CutoffWindow;
use crate::engine::adapter::SourceAdapter;
use crate::engine::pagination::PaginationDriver;
use crate::engine::processor::ArticleProcessor;
use crate::engine::stats::RunStats;
use crate::fetch::{Fetcher, ProxyPool, TransportConfig};
use crate::ledger::LinkLedger;
use crate::store::{RunStatus, Store};
use crate::CancelFlag;
use std::path::Path;
use std::time::Duration;

/// The crawl engine: one instance per process invocation
pub struct CrawlEngine {
    config: Config,
    config_hash: String,
    store: Box<dyn Store>,
    classifier: Box<dyn Classifier>,
    adapters: Vec<Box<dyn SourceAdapter>>,
    proxies: ProxyPool,
    window: CutoffWindow,
    cancel: CancelFlag,
}

impl CrawlEngine {
    /// Creates an engine with adapters built from the configured source
    /// registry
    pub fn new(
        config: Config,
        config_hash: String,
        store: Box<dyn Store>,
        classifier: Box<dyn Classifier>,
        cancel: CancelFlag,
    ) -> crate::Result<Self> {
        let adapters = crate::sources::build_adapters(&config)?;
        Self::with_adapters(config, config_hash, store, classifier, adapters, cancel)
    }

    /// Creates an engine with explicit adapters (used by tests and custom
    /// deployments)
    pub fn with_adapters(
        config: Config,
        config_hash: String,
        store: Box<dyn Store>,
        classifier: Box<dyn Classifier>,
        adapters: Vec<Box<dyn SourceAdapter>>,
        cancel: CancelFlag,
    ) -> crate::Result<Self> {
        let proxies = ProxyPool::from_config(&config.proxy)?;
        let window = CutoffWindow::starting_today(config.crawler.retention_days);

        Ok(Self {
            config,
            config_hash,
            store,
            classifier,
            adapters,
            proxies,
            window,
            cancel,
        })
    }

    /// Runs a complete crawl across all sources
    ///
    /// Per-source errors are logged and never abort the run; the next
    /// scheduled source always executes.
    pub async fn run(&mut self) -> crate::Result<RunStats> {
        let run_id = self.store.create_run(&self.config_hash)?;
        tracing::info!(
            "Starting crawl run {} ({} sources, cutoff {})",
            run_id,
            self.adapters.len(),
            self.window.cutoff()
        );

        let adapters = std::mem::take(&mut self.adapters);
        let mut total = RunStats::default();

        for adapter in &adapters {
            if self.cancel.is_cancelled() {
                break;
            }

            let source_id = adapter.target().id.clone();
            tracing::info!("Crawling source {}", source_id);

            match self.run_source(adapter.as_ref()).await {
                Ok(stats) => {
                    stats.log_summary(&source_id);
                    total.merge(&stats);
                }
                Err(error) => {
                    total.errors += 1;
                    tracing::error!("Source {} failed: {}", source_id, error);
                }
            }
        }

        self.adapters = adapters;

        let status = if self.cancel.is_cancelled() {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        self.store.finish_run(run_id, status)?;

        total.log_summary("run total");
        Ok(total)
    }

    /// Crawls one source across all keywords
    async fn run_source(&mut self, adapter: &dyn SourceAdapter) -> crate::Result<RunStats> {
        let target = adapter.target();
        let mut ledger = LinkLedger::open(
            Path::new(&self.config.output.exception_cache_dir),
            &target.id,
        )?;

        let fetcher = self.fetcher_for(target.accept_invalid_certs);
        let driver = PaginationDriver::new(adapter, &fetcher, self.cancel.clone());
        let keywords = self.keywords_for(target.language);
        let mut stats = RunStats::default();

        for keyword in &keywords {
            if self.cancel.is_cancelled() {
                break;
            }

            let mut processor = ArticleProcessor::new(
                adapter,
                &fetcher,
                self.classifier.as_ref(),
                self.store.as_mut(),
                self.window,
                self.cancel.clone(),
            );

            match driver
                .run_keyword(keyword, &mut ledger, &mut processor, &mut stats)
                .await
            {
                Ok(outcome) => {
                    tracing::debug!(
                        "Keyword '{}' on {}: {} pages, stopped on {}",
                        keyword,
                        target.id,
                        outcome.pages,
                        outcome.stop
                    );
                }
                Err(error) => {
                    // A keyword failure is terminal for that keyword only
                    stats.errors += 1;
                    tracing::warn!("Keyword '{}' on {} failed: {}", keyword, target.id, error);
                }
            }
        }

        // Flushed even when the loop was cut short; partial progress is
        // never lost.
        if let Err(error) = ledger.persist() {
            tracing::error!(
                "Failed to persist exception cache for {}: {}",
                target.id,
                error
            );
        }

        Ok(stats)
    }

    /// Builds the fetcher for one source's transport settings
    fn fetcher_for(&self, accept_invalid_certs: bool) -> Fetcher {
        let transport = TransportConfig::new(
            self.config.crawler.request_timeout_secs,
            accept_invalid_certs,
        );
        Fetcher::new(
            transport,
            self.proxies.clone(),
            self.config.crawler.max_attempts,
            Duration::from_millis(self.config.crawler.backoff_base_ms),
            Duration::from_secs(self.config.crawler.backoff_cap_secs),
            self.cancel.clone(),
        )
    }

    /// Keyword list in the language the source publishes in
    fn keywords_for(&self, language: Language) -> Vec<String> {
        self.config
            .search_terms
            .iter()
            .map(|term| match language {
                Language::Arabic => term.arabic.clone(),
                Language::English => term.english.clone(),
            })
            .collect()
    }
}

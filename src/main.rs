//! Rasid main entry point
//!
//! Command-line interface for the statement-watch crawler.

use anyhow::Context;
use clap::Parser;
use rasid::classify::HttpClassifier;
use rasid::config::load_config_with_hash;
use rasid::store::{SqliteStore, Store};
use rasid::{CancelFlag, CrawlEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rasid: a statement-watch news crawler
///
/// Rasid searches official sources for configured keywords, extracts
/// articles newer than the rolling cutoff, classifies whether watched
/// speakers made relevant statements, and stores the results.
#[derive(Parser, Debug)]
#[command(name = "rasid")]
#[command(version = "1.0.0")]
#[command(about = "A statement-watch news crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl only the source with this id
    #[arg(long, value_name = "ID")]
    source: Option<String>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) =
        load_config_with_hash(&cli.config).context("loading configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    // Narrow to one source when requested
    if let Some(id) = &cli.source {
        config.sources.retain(|entry| &entry.id == id);
        if config.sources.is_empty() {
            anyhow::bail!("no configured source with id '{}'", id);
        }
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rasid=info,warn"),
            1 => EnvFilter::new("rasid=debug,info"),
            2 => EnvFilter::new("rasid=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &rasid::Config) -> anyhow::Result<()> {
    // Adapter construction validates every source id
    let adapters = rasid::sources::build_adapters(config)?;

    println!("=== Rasid Dry Run ===\n");

    println!("Crawler:");
    println!("  Retry ceiling: {} attempts", config.crawler.max_attempts);
    println!("  Retention horizon: {} days", config.crawler.retention_days);
    println!(
        "  Backoff: base {}ms, cap {}s",
        config.crawler.backoff_base_ms, config.crawler.backoff_cap_secs
    );

    println!("\nProxies: {} configured", config.proxy.list.len());
    println!("Classifier: {} via {}", config.classifier.model, config.classifier.endpoint);

    println!("\nSearch terms ({}):", config.search_terms.len());
    for term in &config.search_terms {
        println!("  - {} / {}", term.arabic, term.english);
    }

    println!("\nSources ({}):", adapters.len());
    for adapter in &adapters {
        let target = adapter.target();
        println!(
            "  - {} ({}, {} speaker{})",
            target.id,
            target.country,
            target.speakers.len(),
            if target.speakers.len() == 1 { "" } else { "s" }
        );
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &rasid::Config) -> anyhow::Result<()> {
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;

    println!("=== Crawl Statistics ===\n");
    println!("Articles stored: {}", store.count_articles()?);
    println!("Relevant statements: {}", store.count_relevant()?);

    let counts = store.source_counts()?;
    if !counts.is_empty() {
        println!("\nBy source:");
        for (source, count) in counts {
            println!("  {} - {}", source, count);
        }
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: rasid::Config, config_hash: String) -> anyhow::Result<()> {
    let store = SqliteStore::new(std::path::Path::new(&config.output.database_path))?;
    let classifier = HttpClassifier::new(&config.classifier, &config.search_terms)?;

    let cancel = CancelFlag::new();
    let ctrl_c_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current step and flushing caches");
            ctrl_c_flag.cancel();
        }
    });

    let mut engine = CrawlEngine::new(
        config,
        config_hash,
        Box::new(store),
        Box::new(classifier),
        cancel,
    )?;

    match engine.run().await {
        Ok(stats) => {
            tracing::info!(
                "Crawl finished: {} articles stored, {} relevant",
                stats.articles_stored,
                stats.relevant
            );
            Ok(())
        }
        Err(error) => {
            tracing::error!("Crawl failed: {}", error);
            Err(error.into())
        }
    }
}

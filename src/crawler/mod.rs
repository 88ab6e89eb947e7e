//! Crawler module for listing traversal and product extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Listing pagination
//! - Language-table extraction
//! - Budgeted, bounded-concurrency scheduling

mod budget;
mod cursor;
mod extractor;
mod fetcher;
mod scheduler;

pub use budget::CrawlBudget;
pub use cursor::PaginationCursor;
pub use extractor::extract;
pub use fetcher::{
    build_http_client, fetch_with_retry, FetchError, HttpFetcher, PageFetcher, RawContent,
    RetryPolicy,
};
pub use scheduler::{CrawlScheduler, SchedulerOptions};

use crate::catalog::SearchQuery;
use crate::config::{parse_search_url, resolve_languages, validate, Config};
use crate::output::{CrawlReport, CsvResultSink};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Initialize the output partitions (before any network activity)
/// 3. Build the HTTP client
/// 4. Run the scheduler until completion, interruption or abort
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run started; the report holds its terminal state
/// * `Err(SweepError)` - The run could not start (invalid config, unwritable output)
///
/// # Example
///
/// ```no_run
/// use lingo_sweep::config::load_config;
/// use lingo_sweep::crawler::crawl;
/// use tokio_util::sync::CancellationToken;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sweep.toml"))?;
/// let report = crawl(&config, CancellationToken::new()).await?;
/// println!("{} games processed", report.processed);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, cancel: CancellationToken) -> crate::Result<CrawlReport> {
    validate(config)?;
    let languages = resolve_languages(&config.languages)?;
    let search_url = parse_search_url(&config.catalog.search_url)?;

    let sink = CsvResultSink::initialize(&languages, &config.output.directory)?;
    tracing::info!(
        "Writing results to {} ({} language partitions)",
        sink.directory().display(),
        languages.len()
    );

    let fetcher = HttpFetcher::new(&config.http)?;
    let query = SearchQuery::new(search_url, &languages);

    let scheduler = CrawlScheduler::new(
        Arc::new(fetcher),
        Arc::new(sink),
        query,
        languages,
        SchedulerOptions::from_config(config),
    )
    .with_cancellation(cancel);

    Ok(scheduler.run().await)
}

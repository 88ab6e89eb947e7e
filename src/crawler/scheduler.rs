//! Crawl scheduler - main crawl orchestration logic
//!
//! The scheduler is the single producer of work. It pulls listing pages from
//! the [`PaginationCursor`], reserves a budget slot for every new candidate,
//! and hands the candidate to a bounded pool of tasks that each run
//! fetch → extract → record. It stops submitting when the listing ends, the
//! budget is met, an external stop is requested, or a fatal error occurs,
//! then drains in-flight tasks and flushes the sink.

use crate::catalog::{CandidateLink, Language, SearchQuery};
use crate::config::Config;
use crate::crawler::budget::CrawlBudget;
use crate::crawler::cursor::PaginationCursor;
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::{fetch_with_retry, PageFetcher, RetryPolicy};
use crate::output::{CrawlReport, OutputError, ResultSink};
use crate::state::{CrawlState, InaccessibleReason, ScrapeOutcome};
use crate::SweepError;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Tunables for one run
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Number of products to process
    pub max_items: u64,

    /// Size of the worker pool
    pub workers: usize,

    /// Optional cap on listing pages
    pub max_pages: Option<u32>,

    /// Listing page to start from
    pub start_page: u32,

    pub retry: RetryPolicy,
}

impl SchedulerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_items: config.crawler.max_games,
            workers: config.crawler.workers.max(1) as usize,
            max_pages: config.crawler.max_pages,
            start_page: config.crawler.start_page,
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

/// Everything a unit of work needs, shared between tasks
struct UnitContext {
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn ResultSink>,
    languages: Vec<Language>,
    retry: RetryPolicy,
    budget: Arc<CrawlBudget>,
    /// External stop signal
    cancel: CancellationToken,
    /// Raised by a task whose outcome could not be recorded
    abort: CancellationToken,
}

/// How a unit of work ended
#[derive(Debug)]
enum UnitResult {
    Accessible,
    Inaccessible(InaccessibleReason),
    /// The sink rejected the outcome
    Failed(OutputError),
}

/// Totals of finished units
#[derive(Default)]
struct Tally {
    accessible: u64,
    inaccessible: HashMap<InaccessibleReason, u64>,
    failure: Option<SweepError>,
}

impl Tally {
    fn absorb(&mut self, joined: Result<UnitResult, JoinError>) {
        match joined {
            Ok(UnitResult::Accessible) => self.accessible += 1,
            Ok(UnitResult::Inaccessible(reason)) => {
                *self.inaccessible.entry(reason).or_insert(0) += 1;
            }
            Ok(UnitResult::Failed(error)) => {
                self.failure.get_or_insert(SweepError::Output(error));
            }
            Err(join_error) => {
                self.failure
                    .get_or_insert(SweepError::Worker(join_error.to_string()));
            }
        }
    }

    /// Collects units that already finished without waiting for the rest
    fn reap(&mut self, tasks: &mut JoinSet<UnitResult>) {
        while let Some(joined) = tasks.try_join_next() {
            self.absorb(joined);
        }
    }
}

/// Why the producer loop stopped waiting
enum Interruption {
    Cancelled,
    Aborted,
}

/// Orchestrates a crawl run
pub struct CrawlScheduler {
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn ResultSink>,
    query: SearchQuery,
    languages: Vec<Language>,
    options: SchedulerOptions,
    cancel: CancellationToken,
    state: CrawlState,
}

impl CrawlScheduler {
    /// Creates an idle scheduler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of listing and product pages
    /// * `sink` - Destination of outcomes; must already be initialized
    /// * `query` - Builds listing URLs
    /// * `languages` - Languages to extract
    /// * `options` - Budget, pool size and retry policy
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        sink: Arc<dyn ResultSink>,
        query: SearchQuery,
        languages: Vec<Language>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            fetcher,
            sink,
            query,
            languages,
            options,
            cancel: CancellationToken::new(),
            state: CrawlState::Idle,
        }
    }

    /// Uses `cancel` as the external stop signal
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn transition(&mut self, next: CrawlState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Crawl state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Runs the crawl to a terminal state
    ///
    /// Per-URI failures never end the run; they are recorded as inaccessible
    /// outcomes. The returned report carries the terminal state and, for an
    /// aborted run, the error that caused it.
    pub async fn run(mut self) -> CrawlReport {
        let started_at = Utc::now();
        self.transition(CrawlState::Running);

        tracing::info!(
            "Scanning up to {} games for: {}",
            self.options.max_items,
            self.languages
                .iter()
                .map(|l| l.key())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let budget = Arc::new(CrawlBudget::new(self.options.max_items));
        let abort = CancellationToken::new();
        let context = Arc::new(UnitContext {
            fetcher: Arc::clone(&self.fetcher),
            sink: Arc::clone(&self.sink),
            languages: self.languages.clone(),
            retry: self.options.retry,
            budget: Arc::clone(&budget),
            cancel: self.cancel.clone(),
            abort: abort.clone(),
        });

        let semaphore = Arc::new(Semaphore::new(self.options.workers));
        let mut tasks: JoinSet<UnitResult> = JoinSet::new();
        let mut cursor = PaginationCursor::new(Arc::clone(&self.fetcher), self.query.clone())
            .starting_at(self.options.start_page)
            .with_max_pages(self.options.max_pages);

        let mut tally = Tally::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut skipped_links = 0u64;
        let mut duplicate_links = 0u64;
        let mut interrupted = false;
        let mut fatal: Option<SweepError> = None;

        'pages: loop {
            if budget.is_exhausted() {
                tracing::info!("Crawl budget of {} reached", budget.max());
                break;
            }

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(Interruption::Cancelled),
                _ = abort.cancelled() => Err(Interruption::Aborted),
                next = cursor.next() => Ok(next),
            };

            let page = match next {
                Ok(Ok(Some(page))) => page,
                Ok(Ok(None)) => break,
                Ok(Err(error)) => {
                    tracing::error!("Pagination failed: {}", error);
                    fatal = Some(error);
                    break;
                }
                Err(Interruption::Cancelled) => {
                    interrupted = true;
                    break;
                }
                Err(Interruption::Aborted) => break,
            };

            skipped_links += page.skipped as u64;
            tally.reap(&mut tasks);

            for link in page.links {
                if !seen.insert(link.uri().to_string()) {
                    tracing::debug!("Skipping duplicate candidate {}", link.uri());
                    duplicate_links += 1;
                    continue;
                }

                if !budget.try_reserve() {
                    break 'pages;
                }

                let permit = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(Interruption::Cancelled),
                    _ = abort.cancelled() => Err(Interruption::Aborted),
                    permit = Arc::clone(&semaphore).acquire_owned() => Ok(permit),
                };

                match permit {
                    Ok(Ok(permit)) => {
                        tasks.spawn(process_unit(Arc::clone(&context), link, permit));
                        tally.reap(&mut tasks);
                    }
                    Ok(Err(_)) => {
                        budget.release();
                        fatal = Some(SweepError::Worker("worker pool closed".to_string()));
                        break 'pages;
                    }
                    Err(Interruption::Cancelled) => {
                        budget.release();
                        interrupted = true;
                        break 'pages;
                    }
                    Err(Interruption::Aborted) => {
                        budget.release();
                        break 'pages;
                    }
                }
            }
        }

        tally.reap(&mut tasks);
        if interrupted {
            tracing::warn!(
                "Stop requested, waiting for {} in-flight games",
                tasks.len()
            );
        }

        // Drain in-flight work
        while let Some(joined) = tasks.join_next().await {
            tally.absorb(joined);
        }

        let mut fatal = fatal.or(tally.failure);

        if let Err(error) = self.sink.flush() {
            tracing::error!("Failed to flush output: {}", error);
            fatal.get_or_insert(SweepError::Output(error));
        }

        // A stop that arrives while draining still cuts retries short
        let final_state = if fatal.is_some() {
            CrawlState::Aborted
        } else if interrupted || self.cancel.is_cancelled() {
            CrawlState::Interrupted
        } else {
            CrawlState::Completed
        };
        self.transition(final_state);

        let report = CrawlReport {
            state: final_state,
            processed: budget.completed(),
            accessible: tally.accessible,
            inaccessible: tally.inaccessible,
            pages_fetched: u64::from(cursor.pages_fetched()),
            skipped_links,
            duplicate_links,
            started_at,
            finished_at: Utc::now(),
            error: fatal,
        };

        tracing::info!(
            "Crawl {}: {} games processed ({} accessible, {} inaccessible) across {} pages",
            report.state,
            report.processed,
            report.accessible,
            report.inaccessible_total(),
            report.pages_fetched
        );

        report
    }
}

/// Fetches, extracts and records one candidate
async fn process_unit(
    context: Arc<UnitContext>,
    link: CandidateLink,
    _permit: OwnedSemaphorePermit,
) -> UnitResult {
    let uri = link.uri();
    tracing::debug!("Checking {}", uri);

    let outcome = match fetch_with_retry(
        context.fetcher.as_ref(),
        uri,
        &context.retry,
        &context.cancel,
    )
    .await
    {
        Ok(content) => extract(&content.body, uri, &context.languages),
        Err(error) => {
            tracing::warn!("Giving up on {}: {}", uri, error);
            ScrapeOutcome::inaccessible(uri, error.inaccessible_reason())
        }
    };

    if let Err(error) = context.sink.record(&outcome, uri) {
        tracing::error!("Failed to record outcome for {}: {}", uri, error);
        context.abort.cancel();
        return UnitResult::Failed(error);
    }

    let done = context.budget.complete();
    if done % 10 == 0 {
        tracing::info!("Progress: {}/{} games processed", done, context.budget.max());
    }

    match outcome {
        ScrapeOutcome::Accessible {
            name,
            support_by_language,
        } => {
            tracing::debug!(
                "{} lists {} of the requested languages",
                name,
                support_by_language.len()
            );
            UnitResult::Accessible
        }
        ScrapeOutcome::Inaccessible { reason, .. } => {
            if reason == InaccessibleReason::AgeGated {
                tracing::warn!("{} is behind an age gate", uri);
            }
            UnitResult::Inaccessible(reason)
        }
    }
}

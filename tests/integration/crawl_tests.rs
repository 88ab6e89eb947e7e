//! Integration tests for the crawler
//!
//! Scheduler scenarios run against an in-memory catalog so that timing and
//! failures are deterministic; the full stack (HTTP client, CSV partitions)
//! runs against wiremock servers.

use async_trait::async_trait;
use lingo_sweep::catalog::{Language, SearchQuery};
use lingo_sweep::config::Config;
use lingo_sweep::crawler::{
    crawl, CrawlScheduler, FetchError, PageFetcher, RawContent, RetryPolicy, SchedulerOptions,
};
use lingo_sweep::output::{CsvResultSink, OutputError, OutputResult, ResultSink, INACCESSIBLE_FILE};
use lingo_sweep::state::{CrawlState, InaccessibleReason, ScrapeOutcome};
use lingo_sweep::SweepError;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = "http://catalog.test";

// ===== Page builders =====

/// A language-table row: (label, interface, audio, subtitles)
type Row = (&'static str, bool, bool, bool);

fn product_html(name: &str, rows: &[Row]) -> String {
    let cell = |on: bool| {
        if on {
            r#"<td class="checkcol"><span>✔</span></td>"#
        } else {
            r#"<td class="checkcol"></td>"#
        }
    };
    let rows: String = rows
        .iter()
        .map(|(label, interface, audio, subtitles)| {
            format!(
                "<tr><td>{}</td>{}{}{}</tr>",
                label,
                cell(*interface),
                cell(*audio),
                cell(*subtitles)
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <div id="appHubAppName">{}</div>
        <table class="game_language_options">
            <tr><th></th><th>Interface</th><th>Full Audio</th><th>Subtitles</th></tr>
            {}
        </table>
        </body></html>"#,
        name, rows
    )
}

fn age_gate_html() -> String {
    r#"<html><body><div id="app_agegate">Please enter your birth date to continue</div></body></html>"#
        .to_string()
}

fn listing_html(hrefs: &[String]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| format!(r#"<a class="search_result_row" href="{}">row</a>"#, href))
        .collect();
    format!(
        r#"<html><body><div id="search_result_container">{}</div></body></html>"#,
        rows
    )
}

// ===== In-memory catalog =====

#[derive(Clone)]
enum Product {
    Page(String),
    Fails(FetchError),
}

/// Serves listing pages and product pages from memory
#[derive(Default)]
struct Catalog {
    pages: Vec<Vec<u32>>,
    products: HashMap<u32, Product>,
    product_delays: HashMap<u32, Duration>,
    listing_delays: HashMap<u32, Duration>,
    listing_failures: HashMap<u32, FetchError>,
    attempts: Mutex<HashMap<String, u32>>,
}

impl Catalog {
    /// `page_count` pages of `per_page` products numbered from 1
    fn with_pages(page_count: u32, per_page: u32) -> Self {
        let pages = (0..page_count)
            .map(|page| (1..=per_page).map(|i| page * per_page + i).collect())
            .collect();
        Self {
            pages,
            ..Self::default()
        }
    }

    fn product(mut self, id: u32, product: Product) -> Self {
        self.products.insert(id, product);
        self
    }

    fn product_delay(mut self, id: u32, delay: Duration) -> Self {
        self.product_delays.insert(id, delay);
        self
    }

    fn listing_delay(mut self, index: u32, delay: Duration) -> Self {
        self.listing_delays.insert(index, delay);
        self
    }

    fn listing_failure(mut self, index: u32, error: FetchError) -> Self {
        self.listing_failures.insert(index, error);
        self
    }

    fn attempts_for(&self, uri: &str) -> u32 {
        self.attempts.lock().unwrap().get(uri).copied().unwrap_or(0)
    }

    fn listing_requests(&self) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|(uri, _)| uri.contains("/search/"))
            .map(|(_, count)| *count)
            .sum()
    }
}

fn product_uri(id: u32) -> String {
    format!("{}/app/{}/", CATALOG, id)
}

#[async_trait]
impl PageFetcher for Catalog {
    async fn fetch(&self, uri: &str) -> Result<RawContent, FetchError> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(uri.to_string())
            .or_insert(0) += 1;

        let url = Url::parse(uri).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if url.path().starts_with("/search/") {
            let index: u32 = url
                .query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
                .ok_or_else(|| FetchError::HttpStatus(400))?;

            if let Some(delay) = self.listing_delays.get(&index) {
                tokio::time::sleep(*delay).await;
            }
            if let Some(error) = self.listing_failures.get(&index) {
                return Err(error.clone());
            }

            let hrefs: Vec<String> = self
                .pages
                .get(index as usize)
                .map(|ids| ids.iter().map(|id| format!("/app/{}/", id)).collect())
                .unwrap_or_default();
            return Ok(RawContent::html(uri, listing_html(&hrefs)));
        }

        let id: u32 = url
            .path_segments()
            .and_then(|mut segments| segments.nth(1))
            .and_then(|segment| segment.parse().ok())
            .ok_or_else(|| FetchError::HttpStatus(404))?;

        if let Some(delay) = self.product_delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }

        match self.products.get(&id) {
            Some(Product::Page(body)) => Ok(RawContent::html(uri, body.clone())),
            Some(Product::Fails(error)) => Err(error.clone()),
            None => Ok(RawContent::html(
                uri,
                product_html(&format!("Game {}", id), &[("Swedish", true, true, true)]),
            )),
        }
    }
}

// ===== Sinks =====

/// Keeps every recorded outcome in memory
#[derive(Default)]
struct MemorySink {
    records: Mutex<Vec<(String, ScrapeOutcome)>>,
}

impl MemorySink {
    fn uris(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(uri, _)| uri.clone())
            .collect()
    }
}

impl ResultSink for MemorySink {
    fn record(&self, outcome: &ScrapeOutcome, uri: &str) -> OutputResult<()> {
        self.records
            .lock()
            .unwrap()
            .push((uri.to_string(), outcome.clone()));
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}

/// Rejects every write
struct FailingSink;

impl ResultSink for FailingSink {
    fn record(&self, _outcome: &ScrapeOutcome, _uri: &str) -> OutputResult<()> {
        Err(OutputError::Write("disk full".to_string()))
    }

    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}

// ===== Helpers =====

fn languages(names: &[&str]) -> Vec<Language> {
    names.iter().map(|n| Language::parse(n).unwrap()).collect()
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        factor: 2,
        max_delay: Duration::from_millis(5),
    }
}

fn options(max_items: u64, workers: usize) -> SchedulerOptions {
    SchedulerOptions {
        max_items,
        workers,
        max_pages: None,
        start_page: 0,
        retry: fast_retry(),
    }
}

fn scheduler(
    catalog: Arc<Catalog>,
    sink: Arc<dyn ResultSink>,
    langs: Vec<Language>,
    options: SchedulerOptions,
) -> CrawlScheduler {
    let query = SearchQuery::new(
        Url::parse(&format!("{}/search/", CATALOG)).unwrap(),
        &langs,
    );
    CrawlScheduler::new(catalog, sink, query, langs, options)
}

/// Data rows of a CSV partition, checking each has `width` fields
fn csv_rows(path: &Path, width: usize) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert!(
        rows.iter().all(|row| row.len() == width),
        "malformed row in {}",
        path.display()
    );
    rows
}

// ===== Scheduler scenarios =====

#[tokio::test]
async fn test_budget_is_exact_for_any_pool_size() {
    for workers in [1, 4, 32] {
        let catalog = Arc::new(
            Catalog::with_pages(10, 5)
                .product(3, Product::Page(age_gate_html()))
                .product(7, Product::Fails(FetchError::HttpStatus(404)))
                .product_delay(2, Duration::from_millis(20))
                .product_delay(9, Duration::from_millis(5)),
        );
        let sink = Arc::new(MemorySink::default());

        let report = scheduler(
            catalog.clone(),
            sink.clone(),
            languages(&["swedish"]),
            options(17, workers),
        )
        .run()
        .await;

        assert_eq!(report.state, CrawlState::Completed, "workers = {}", workers);
        assert_eq!(report.processed, 17, "workers = {}", workers);
        assert_eq!(report.accessible + report.inaccessible_total(), 17);

        let uris = sink.uris();
        assert_eq!(uris.len(), 17);
        let distinct: HashSet<_> = uris.iter().collect();
        assert_eq!(distinct.len(), 17);

        // 17 candidates span four listing pages of five
        assert_eq!(report.pages_fetched, 4);
        assert_eq!(catalog.attempts_for(&product_uri(18)), 0);
    }
}

#[tokio::test]
async fn test_swedish_scenario_in_memory() {
    let catalog = Arc::new(
        Catalog::with_pages(3, 2)
            .product(
                1,
                Product::Page(product_html("First", &[("Swedish", false, true, false)])),
            )
            .product(2, Product::Page(age_gate_html()))
            .product(
                3,
                Product::Page(product_html("Third", &[("Swedish", true, true, true)])),
            ),
    );
    let sink = Arc::new(MemorySink::default());

    let report = scheduler(
        catalog.clone(),
        sink.clone(),
        languages(&["swedish"]),
        options(3, 8),
    )
    .run()
    .await;

    assert_eq!(report.state, CrawlState::Completed);
    assert_eq!(report.processed, 3);
    assert_eq!(report.accessible, 2);
    assert_eq!(report.inaccessible_count(InaccessibleReason::AgeGated), 1);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(catalog.listing_requests(), 2);
    assert_eq!(catalog.attempts_for(&product_uri(4)), 0);
}

#[tokio::test]
async fn test_failing_uri_does_not_affect_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let langs = languages(&["swedish"]);
    let sink = Arc::new(CsvResultSink::initialize(&langs, dir.path()).unwrap());

    let failing = 2;
    let catalog = Arc::new(
        Catalog::with_pages(1, 4).product(failing, Product::Fails(FetchError::HttpStatus(500))),
    );

    let report = scheduler(catalog.clone(), sink, langs, options(10, 4))
        .run()
        .await;

    assert_eq!(report.state, CrawlState::Completed);
    assert_eq!(report.processed, 4);
    assert_eq!(report.accessible, 3);
    assert_eq!(report.inaccessible_count(InaccessibleReason::Unreachable), 1);

    // Retried up to the policy limit, then isolated
    assert_eq!(catalog.attempts_for(&product_uri(failing)), 3);

    let swedish = csv_rows(&dir.path().join("swedish.csv"), 5);
    let names: HashSet<&str> = swedish.iter().map(|row| row.get(0).unwrap()).collect();
    assert_eq!(names, HashSet::from(["Game 1", "Game 3", "Game 4"]));

    let inaccessible = csv_rows(&dir.path().join(INACCESSIBLE_FILE), 2);
    assert_eq!(inaccessible.len(), 1);
    assert_eq!(&inaccessible[0][0], product_uri(failing));
    assert_eq!(&inaccessible[0][1], "unreachable");
}

#[tokio::test]
async fn test_rows_only_reach_listed_languages() {
    let dir = tempfile::tempdir().unwrap();
    let langs = languages(&["french", "german", "spanish"]);
    let sink = Arc::new(CsvResultSink::initialize(&langs, dir.path()).unwrap());

    let catalog = Arc::new(Catalog::with_pages(1, 1).product(
        1,
        Product::Page(product_html(
            "Bilingual",
            &[
                ("English", true, true, true),
                ("French", true, false, true),
                ("German", true, true, false),
            ],
        )),
    ));

    let report = scheduler(catalog, sink, langs, options(5, 2)).run().await;
    assert_eq!(report.state, CrawlState::Completed);

    let french = csv_rows(&dir.path().join("french.csv"), 5);
    assert_eq!(french.len(), 1);
    assert_eq!(
        french[0].iter().collect::<Vec<_>>(),
        vec!["Bilingual", "true", "false", "true", product_uri(1).as_str()]
    );

    assert_eq!(csv_rows(&dir.path().join("german.csv"), 5).len(), 1);
    assert!(csv_rows(&dir.path().join("spanish.csv"), 5).is_empty());
    assert!(csv_rows(&dir.path().join(INACCESSIBLE_FILE), 2).is_empty());
}

#[tokio::test]
async fn test_listing_exhausted_before_budget() {
    let catalog = Arc::new(Catalog::with_pages(2, 3));
    let sink = Arc::new(MemorySink::default());

    let report = scheduler(catalog, sink, languages(&["swedish"]), options(100, 8))
        .run()
        .await;

    assert_eq!(report.state, CrawlState::Completed);
    assert_eq!(report.processed, 6);
    // Two full pages plus the empty one that ends the listing
    assert_eq!(report.pages_fetched, 3);
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_duplicate_candidates_are_processed_once() {
    let mut catalog = Catalog::with_pages(2, 2);
    catalog.pages[1] = vec![2, 3];
    let catalog = Arc::new(catalog);
    let sink = Arc::new(MemorySink::default());

    let report = scheduler(
        catalog.clone(),
        sink.clone(),
        languages(&["swedish"]),
        options(10, 2),
    )
    .run()
    .await;

    assert_eq!(report.processed, 3);
    assert_eq!(report.duplicate_links, 1);
    assert_eq!(catalog.attempts_for(&product_uri(2)), 1);
}

#[tokio::test]
async fn test_listing_failure_aborts_after_draining() {
    let catalog = Arc::new(
        Catalog::with_pages(3, 2).listing_failure(1, FetchError::Network("reset".to_string())),
    );
    let sink = Arc::new(MemorySink::default());

    let report = scheduler(
        catalog.clone(),
        sink.clone(),
        languages(&["swedish"]),
        options(10, 4),
    )
    .run()
    .await;

    assert_eq!(report.state, CrawlState::Aborted);
    assert!(matches!(
        report.error,
        Some(SweepError::PaginationFetch { .. })
    ));
    // Work submitted from page 0 still finished and was recorded
    assert_eq!(report.processed, 2);
    assert_eq!(sink.uris().len(), 2);
    // The listing endpoint is not retried
    assert_eq!(catalog.listing_requests(), 2);
}

#[tokio::test]
async fn test_sink_failure_aborts() {
    let catalog = Arc::new(Catalog::with_pages(5, 5));

    let report = scheduler(
        catalog,
        Arc::new(FailingSink),
        languages(&["swedish"]),
        options(25, 2),
    )
    .run()
    .await;

    assert_eq!(report.state, CrawlState::Aborted);
    assert!(matches!(report.error, Some(SweepError::Output(_))));
    assert_eq!(report.processed, 0);
}

#[tokio::test]
async fn test_stop_signal_drains_in_flight_work() {
    let dir = tempfile::tempdir().unwrap();
    let langs = languages(&["swedish"]);
    let sink = Arc::new(CsvResultSink::initialize(&langs, dir.path()).unwrap());

    // Three products in flight; the next listing page is slow enough that
    // the stop arrives while the scheduler waits for it
    let catalog = Arc::new(
        Catalog::with_pages(3, 3)
            .product_delay(1, Duration::from_millis(10))
            .product_delay(2, Duration::from_millis(300))
            .product_delay(3, Duration::from_millis(300))
            .listing_delay(1, Duration::from_secs(10)),
    );

    let cancel = CancellationToken::new();
    let scheduler = scheduler(catalog.clone(), sink, langs, options(9, 8))
        .with_cancellation(cancel.clone());

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let report = scheduler.run().await;
    stopper.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.state, CrawlState::Interrupted);
    assert!(!report.state.is_success());
    assert_ne!(report.state.exit_code(), 0);

    // In-flight fetches were allowed to finish
    assert_eq!(report.processed, 3);
    assert_eq!(catalog.attempts_for(&product_uri(4)), 0);

    let rows = csv_rows(&dir.path().join("swedish.csv"), 5);
    assert_eq!(rows.len(), 3);
    let uris: HashSet<&str> = rows.iter().map(|row| row.get(4).unwrap()).collect();
    assert_eq!(uris.len(), 3);
}

#[tokio::test]
async fn test_stop_during_backoff_records_last_failure() {
    let dir = tempfile::tempdir().unwrap();
    let langs = languages(&["swedish"]);
    let sink = Arc::new(CsvResultSink::initialize(&langs, dir.path()).unwrap());

    let failing = 2;
    let catalog = Arc::new(
        Catalog::with_pages(3, 2)
            .product(failing, Product::Fails(FetchError::HttpStatus(503)))
            .listing_delay(1, Duration::from_secs(10)),
    );

    // The first retry would wait far longer than the test runs
    let options = SchedulerOptions {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            factor: 2,
            max_delay: Duration::from_secs(5),
        },
        ..options(6, 4)
    };

    let cancel = CancellationToken::new();
    let scheduler =
        scheduler(catalog.clone(), sink, langs, options).with_cancellation(cancel.clone());

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let report = scheduler.run().await;
    stopper.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.state, CrawlState::Interrupted);
    assert_eq!(catalog.attempts_for(&product_uri(failing)), 1);

    // Both submitted units produced an outcome
    assert_eq!(report.processed, 2);
    assert_eq!(report.accessible, 1);
    assert_eq!(report.inaccessible_count(InaccessibleReason::Unreachable), 1);

    assert_eq!(csv_rows(&dir.path().join("swedish.csv"), 5).len(), 1);
    let inaccessible = csv_rows(&dir.path().join(INACCESSIBLE_FILE), 2);
    assert_eq!(inaccessible.len(), 1);
    assert_eq!(&inaccessible[0][0], product_uri(failing));
    assert_eq!(&inaccessible[0][1], "unreachable");
}

#[tokio::test]
async fn test_stop_before_start_submits_nothing() {
    let catalog = Arc::new(Catalog::with_pages(2, 2));
    let sink = Arc::new(MemorySink::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = scheduler(catalog.clone(), sink.clone(), languages(&["swedish"]), options(4, 2))
        .with_cancellation(cancel)
        .run()
        .await;

    assert_eq!(report.state, CrawlState::Interrupted);
    assert_eq!(report.processed, 0);
    assert!(sink.uris().is_empty());
    assert_eq!(catalog.listing_requests(), 0);
}

// ===== Full stack against a mock storefront =====

fn test_config(search_url: String, output: &Path, langs: &[&str], max_games: u64) -> Config {
    let mut config = Config::default();
    config.languages = langs.iter().map(|l| l.to_string()).collect();
    config.crawler.max_games = max_games;
    config.crawler.workers = 4;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config.catalog.search_url = search_url;
    config.output.directory = output.to_path_buf();
    config
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_swedish_scenario() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pages = [["/app/1/One/", "/app/2/Two/"], ["/app/3/Three/", "/app/4/Four/"]];
    for (index, hrefs) in pages.iter().enumerate() {
        let hrefs: Vec<String> = hrefs.iter().map(|h| format!("{}{}", base_url, h)).collect();
        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("page", index.to_string()))
            .and(query_param("supportedlang", "swedish"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(listing_html(&hrefs), "text/html"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    mount_html(
        &mock_server,
        "/app/1/One/",
        product_html("One", &[("English", true, true, true), ("Swedish", false, true, false)]),
    )
    .await;
    mount_html(&mock_server, "/app/2/Two/", age_gate_html()).await;
    mount_html(
        &mock_server,
        "/app/3/Three/",
        product_html("Three", &[("Swedish", true, true, true)]),
    )
    .await;

    // Budget is met before the fourth product is needed
    Mock::given(method("GET"))
        .and(path("/app/4/Four/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(format!("{}/search/", base_url), dir.path(), &["swedish"], 3);

    let report = crawl(&config, CancellationToken::new())
        .await
        .expect("crawl failed to start");

    assert_eq!(report.state, CrawlState::Completed);
    assert_eq!(report.processed, 3);
    assert_eq!(report.pages_fetched, 2);

    let swedish = csv_rows(&dir.path().join("swedish.csv"), 5);
    assert_eq!(swedish.len(), 2);
    let mut names: Vec<&str> = swedish.iter().map(|row| row.get(0).unwrap()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["One", "Three"]);
    assert!(swedish.iter().all(|row| &row[2] == "true"));

    let inaccessible = csv_rows(&dir.path().join(INACCESSIBLE_FILE), 2);
    assert_eq!(inaccessible.len(), 1);
    assert_eq!(&inaccessible[0][0], format!("{}/app/2/Two/", base_url));
    assert_eq!(&inaccessible[0][1], "age_gated");
}

#[tokio::test]
async fn test_full_crawl_reports_missing_products() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            listing_html(&[
                format!("{}/app/1/", base_url),
                format!("{}/app/2/", base_url),
                format!("{}/bundle/3/", base_url),
            ]),
            "text/html",
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(listing_html(&[]), "text/html"))
        .mount(&mock_server)
        .await;

    mount_html(
        &mock_server,
        "/app/1/",
        product_html("Present", &[("French", true, false, false)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/app/2/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(format!("{}/search/", base_url), dir.path(), &["french"], 10);

    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.state, CrawlState::Completed);
    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped_links, 1);
    assert_eq!(report.inaccessible_count(InaccessibleReason::NotFound), 1);

    let inaccessible = csv_rows(&dir.path().join(INACCESSIBLE_FILE), 2);
    assert_eq!(&inaccessible[0][1], "not_found");
}

#[tokio::test]
async fn test_invalid_invocation_makes_no_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let search_url = format!("{}/search/", mock_server.uri());
    let dir = tempfile::tempdir().unwrap();

    // Zero languages
    let config = test_config(search_url.clone(), dir.path(), &[], 5);
    assert!(matches!(
        crawl(&config, CancellationToken::new()).await,
        Err(SweepError::Config(_))
    ));

    // Non-positive maximum
    let config = test_config(search_url.clone(), dir.path(), &["swedish"], 0);
    assert!(matches!(
        crawl(&config, CancellationToken::new()).await,
        Err(SweepError::Config(_))
    ));

    // Output location is a file, not a directory
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = test_config(search_url, &blocker, &["swedish"], 5);
    assert!(matches!(
        crawl(&config, CancellationToken::new()).await,
        Err(SweepError::Output(OutputError::NotWritable { .. }))
    ));
}

#[tokio::test]
async fn test_rerun_reinitializes_partitions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            listing_html(&[format!("{}/app/1/", base_url)]),
            "text/html",
        ))
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/app/1/",
        product_html("Again", &[("Swedish", true, true, true)]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(format!("{}/search/", base_url), dir.path(), &["swedish"], 1);

    for _ in 0..2 {
        let report = crawl(&config, CancellationToken::new()).await.unwrap();
        assert_eq!(report.state, CrawlState::Completed);
    }

    assert_eq!(csv_rows(&dir.path().join("swedish.csv"), 5).len(), 1);
}

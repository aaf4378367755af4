use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use webfetch_core::{FailureKind, FetchFailure, FetchOutcome, FetchSuccess};
use webfetch_engine::{fetch_all, BatchOptions, Fetcher, PageResult};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Scripted fetcher: serves canned outcomes with optional per-URL delays and
/// tracks how many fetches are in flight at once.
struct ScriptedFetcher {
    outcomes: HashMap<String, FetchOutcome>,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            delays: HashMap::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn serve(mut self, url: &str, body: &str) -> Self {
        self.outcomes.insert(
            url.to_string(),
            FetchOutcome::Success(FetchSuccess {
                status_code: 200,
                content_type: Some("text/html".to_string()),
                body: body.to_string(),
                elapsed: Duration::from_millis(1),
            }),
        );
        self
    }

    fn fail(mut self, url: &str, kind: FailureKind) -> Self {
        self.outcomes.insert(
            url.to_string(),
            FetchOutcome::Failure(FetchFailure::new(kind, "scripted failure")),
        );
        self
    }

    fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    fn observed_max(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Option<Duration>) -> FetchOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        let outcome = self.outcomes.get(url).cloned().unwrap_or_else(|| {
            FetchOutcome::Failure(FetchFailure::new(FailureKind::Network, "unscripted url"))
        });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|url| url.to_string()).collect()
}

fn result_urls(results: &[PageResult]) -> Vec<String> {
    results
        .iter()
        .map(|result| match result {
            PageResult::Success(page) => page.url.clone(),
            PageResult::Failure(failure) => failure.url.clone(),
        })
        .collect()
}

#[tokio::test]
async fn one_failure_never_aborts_siblings_and_order_is_kept() {
    init_logging();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .serve("https://a.com/1", "<p>one</p>")
            .fail("https://a.com/2", FailureKind::HttpStatus(500))
            .serve("https://a.com/3", "<p>three</p>"),
    );
    let input = urls(&["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
    let options = BatchOptions {
        max_concurrent: 1,
        ..BatchOptions::default()
    };

    let summary = fetch_all(fetcher, &input, &options).await;

    assert_eq!(summary.total_urls, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(result_urls(&summary.results), input);
    assert!(summary.results[0].is_success());
    assert!(!summary.results[1].is_success());
    assert!(summary.results[2].is_success());
    match &summary.results[1] {
        PageResult::Failure(failure) => {
            assert_eq!(failure.status, "failed");
            assert!(failure.error.contains("500"));
        }
        PageResult::Success(_) => unreachable!(),
    }
}

#[tokio::test]
async fn admission_ceiling_bounds_in_flight_fetches() {
    init_logging();
    let mut fetcher = ScriptedFetcher::new();
    let mut input = Vec::new();
    for index in 0..6 {
        let url = format!("https://a.com/{index}");
        fetcher = fetcher
            .serve(&url, "<p>page</p>")
            .delay(&url, Duration::from_millis(30));
        input.push(url);
    }
    let fetcher = Arc::new(fetcher);
    let options = BatchOptions {
        max_concurrent: 2,
        ..BatchOptions::default()
    };

    let summary = fetch_all(Arc::clone(&fetcher), &input, &options).await;

    assert_eq!(summary.successful, 6);
    assert!(
        fetcher.observed_max() <= 2,
        "observed {} concurrent fetches",
        fetcher.observed_max()
    );
}

#[tokio::test]
async fn completion_order_never_reorders_results() {
    init_logging();
    // The first URL finishes last; slots must still line up with the input.
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .serve("https://a.com/slow", "<p>slow</p>")
            .delay("https://a.com/slow", Duration::from_millis(80))
            .serve("https://a.com/fast", "<p>fast</p>")
            .serve("https://a.com/faster", "<p>faster</p>"),
    );
    let input = urls(&["https://a.com/slow", "https://a.com/fast", "https://a.com/faster"]);
    let options = BatchOptions {
        max_concurrent: 3,
        ..BatchOptions::default()
    };

    let summary = fetch_all(fetcher, &input, &options).await;

    assert_eq!(result_urls(&summary.results), input);
}

#[tokio::test]
async fn empty_input_yields_empty_summary() {
    init_logging();
    let fetcher = Arc::new(ScriptedFetcher::new());

    let summary = fetch_all(fetcher, &[], &BatchOptions::default()).await;

    assert_eq!(summary.total_urls, 0);
    assert_eq!(summary.successful, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.results, vec![]);
}

#[tokio::test]
async fn batch_items_carry_extracted_content() {
    init_logging();
    let fetcher = Arc::new(ScriptedFetcher::new().serve(
        "https://a.com/page",
        "<html><body><article><p>Body text</p></article></body></html>",
    ));
    let input = urls(&["https://a.com/page"]);

    let summary = fetch_all(fetcher, &input, &BatchOptions::default()).await;

    match &summary.results[0] {
        PageResult::Success(page) => {
            assert_eq!(page.content.as_deref(), Some("Body text"));
            assert!(page.metadata.is_some());
            assert!(page.raw_html.is_none());
        }
        PageResult::Failure(failure) => panic!("unexpected failure: {}", failure.error),
    }
}

use std::sync::Arc;

use engine_logging::engine_debug;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::fetch::Fetcher;
use crate::ops::{self, FetchPageRequest, PageResult};

/// Options applied to every URL in a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub extract_content: bool,
    pub include_metadata: bool,
    /// Per-URL request timeout in seconds.
    pub timeout_secs: f64,
    /// Admission ceiling for concurrently in-flight fetches.
    pub max_concurrent: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extract_content: true,
            include_metadata: true,
            timeout_secs: 30.0,
            max_concurrent: 5,
        }
    }
}

/// Aggregate outcome of a batch; `results` keeps input order and always has
/// one entry per input URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_urls: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<PageResult>,
}

/// Fan the URL list out to the single-page pipeline.
///
/// At most `max_concurrent` fetches are in flight at once; the rest queue for
/// a slot. Every URL is attempted exactly once, a failing item never cancels
/// its siblings, and a finished item frees its slot immediately. Results are
/// written into slots indexed by input position, so completion order never
/// leaks into the output.
pub async fn fetch_all<F>(fetcher: Arc<F>, urls: &[String], options: &BatchOptions) -> BatchSummary
where
    F: Fetcher + 'static,
{
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));

    let mut handles = Vec::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fetcher = Arc::clone(&fetcher);
        let request = FetchPageRequest {
            url: url.clone(),
            extract_content: options.extract_content,
            include_metadata: options.include_metadata,
            timeout: options.timeout_secs,
        };
        handles.push((
            index,
            url.clone(),
            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return PageResult::failure(&request.url, "batch queue closed");
                    }
                };
                ops::fetch_page(fetcher.as_ref(), &request).await
            }),
        ));
    }

    let mut slots: Vec<Option<PageResult>> = urls.iter().map(|_| None).collect();
    for (index, url, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            // A panicking item is still just one failed item.
            Err(err) => PageResult::failure(url, format!("task failed: {err}")),
        };
        slots[index] = Some(result);
    }

    let results: Vec<PageResult> = slots.into_iter().flatten().collect();
    let successful = results.iter().filter(|result| result.is_success()).count();
    let failed = results.len() - successful;
    engine_debug!(
        "batch finished: {} urls, {successful} ok, {failed} failed",
        urls.len()
    );

    BatchSummary {
        total_urls: urls.len(),
        successful,
        failed,
        results,
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use tokio::sync::OnceCell;
use webfetch_core::{FailureKind, FetchFailure, FetchOutcome, FetchSuccess};

use crate::decode::decode_body;

/// Browser-like user agent presented to remote servers by default.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Immutable base configuration for the shared HTTP client.
///
/// Per-call variation (the request timeout) is passed to [`Fetcher::fetch`];
/// nothing here is ever mutated for one in-flight call's sake.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub pool_max_idle_per_host: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            pool_max_idle_per_host: 10,
            max_bytes: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A single HTTP retrieval, fulfilled by [`HttpFetcher`] in production and by
/// scripted fakes in tests.
///
/// Every failure path is a [`FetchOutcome::Failure`] value; implementations
/// never propagate errors past this boundary.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> FetchOutcome;
}

/// HTTP fetcher backed by one lazily created, connection-pooled client.
///
/// Clones share the same pool. The client is built on first use and released
/// when the last clone drops, on every exit path.
#[derive(Clone)]
pub struct HttpFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    settings: FetchSettings,
    client: OnceCell<reqwest::Client>,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            inner: Arc::new(FetcherInner {
                settings,
                client: OnceCell::new(),
            }),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client, FetchFailure> {
        let settings = &self.inner.settings;
        self.inner
            .client
            .get_or_try_init(|| async {
                let mut headers = HeaderMap::new();
                headers.insert(
                    ACCEPT,
                    HeaderValue::from_static(
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    ),
                );
                headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

                reqwest::Client::builder()
                    .user_agent(settings.user_agent.clone())
                    .default_headers(headers)
                    .connect_timeout(settings.connect_timeout)
                    .timeout(settings.request_timeout)
                    .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
                    .pool_max_idle_per_host(settings.pool_max_idle_per_host)
                    .build()
                    .map_err(|err| FetchFailure::new(FailureKind::Network, err.to_string()))
            })
            .await
    }

    async fn try_fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<FetchSuccess, FetchFailure> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchFailure::new(FailureKind::InvalidInput, err.to_string()))?;
        let client = self.client().await?;
        let max_bytes = self.inner.settings.max_bytes;
        let started = Instant::now();

        let mut request = client.get(parsed);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if let Some(declared) = response.content_length() {
            if declared > max_bytes {
                return Err(FetchFailure::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(declared),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchFailure::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let (body, encoding) = decode_body(&bytes, content_type.as_deref());
        engine_debug!(
            "fetched {url}: {} bytes, decoded as {encoding}",
            bytes.len()
        );

        Ok(FetchSuccess {
            status_code: status.as_u16(),
            content_type,
            body,
            elapsed: started.elapsed(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> FetchOutcome {
        match self.try_fetch(url, timeout).await {
            Ok(success) => FetchOutcome::Success(success),
            Err(failure) => {
                engine_warn!("fetch failed for {url}: {failure}");
                FetchOutcome::Failure(failure)
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::new(FailureKind::Timeout, err.to_string());
    }
    FetchFailure::new(FailureKind::Network, err.to_string())
}

//! Typed request/response surface for the five core operations.
//!
//! Transport layers marshal their own wire formats onto these structures.
//! Only a top-level invalid request (a blank URL) is rejected up front; every
//! failure after that point is captured as a structured result value, and
//! batch items never abort their siblings.

use std::sync::Arc;
use std::time::Duration;

use engine_logging::engine_warn;
use serde::{Deserialize, Serialize};
use url::Url;
use webfetch_core::{
    extract_content, extract_metadata, search_content, FetchOutcome, LinkFilters, PageMetadata,
    SearchMatch,
};

use crate::batch::{self, BatchOptions, BatchSummary};
use crate::fetch::Fetcher;

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> f64 {
    30.0
}

fn default_max_concurrent() -> usize {
    5
}

fn default_context_chars() -> usize {
    200
}

/// Rejected before any fetch is attempted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn require_url(url: &str) -> Result<(), RequestError> {
    if url.trim().is_empty() {
        return Err(RequestError::InvalidInput("url is required".to_string()));
    }
    Ok(())
}

/// Arguments for `fetch_webpage`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchPageRequest {
    pub url: String,
    #[serde(default = "default_true")]
    pub extract_content: bool,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout: f64,
}

impl FetchPageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extract_content: true,
            include_metadata: true,
            timeout: default_timeout_secs(),
        }
    }

    pub(crate) fn timeout_duration(&self) -> Option<Duration> {
        (self.timeout.is_finite() && self.timeout > 0.0)
            .then(|| Duration::from_secs_f64(self.timeout))
    }
}

/// Arguments for `fetch_multiple_pages`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchBatchRequest {
    pub urls: Vec<String>,
    #[serde(default = "default_true")]
    pub extract_content: bool,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout: f64,
}

/// Arguments for `search_webpage_content`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub url: String,
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
}

/// Arguments for `extract_links`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinksRequest {
    pub url: String,
    #[serde(default)]
    pub filter_internal: bool,
    #[serde(default)]
    pub filter_external: bool,
    #[serde(default)]
    pub include_anchors: bool,
}

/// Arguments for `get_page_metadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataRequest {
    pub url: String,
}

/// Structured per-operation failure, never an exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpFailure {
    pub url: String,
    pub error: String,
    pub status: String,
}

impl OpFailure {
    fn new(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
            status: "failed".to_string(),
        }
    }
}

/// Successful single-page result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSuccess {
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub content_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageResult {
    Success(Box<PageSuccess>),
    Failure(OpFailure),
}

impl PageResult {
    pub(crate) fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        PageResult::Failure(OpFailure::new(url, error))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PageResult::Success(_))
    }
}

/// Fetch a single page and derive the requested artifacts.
///
/// `extract_content=false` returns the raw document text instead of the
/// extracted main content. `content_length` always reports the length of the
/// raw body text retrieved.
pub async fn fetch_webpage<F>(
    fetcher: &F,
    request: &FetchPageRequest,
) -> Result<PageResult, RequestError>
where
    F: Fetcher + ?Sized,
{
    require_url(&request.url)?;
    Ok(fetch_page(fetcher, request).await)
}

/// Single-page pipeline without top-level validation; batch items route here
/// so one bad URL becomes a per-item failure instead of aborting siblings.
pub(crate) async fn fetch_page<F>(fetcher: &F, request: &FetchPageRequest) -> PageResult
where
    F: Fetcher + ?Sized,
{
    match fetcher.fetch(&request.url, request.timeout_duration()).await {
        FetchOutcome::Success(page) => {
            let mut result = PageSuccess {
                url: request.url.clone(),
                status_code: page.status_code,
                content_type: page.content_type.clone().unwrap_or_default(),
                content_length: page.body.len(),
                metadata: None,
                content: None,
                raw_html: None,
            };
            if request.include_metadata {
                result.metadata = Some(extract_metadata(&page.body));
            }
            if request.extract_content {
                result.content = Some(extract_content(&page.body).text);
            } else {
                result.raw_html = Some(page.body);
            }
            PageResult::Success(Box::new(result))
        }
        FetchOutcome::Failure(failure) => PageResult::failure(&request.url, failure.to_string()),
    }
}

/// Fetch many pages under a concurrency ceiling; results keep input order.
pub async fn fetch_multiple_pages<F>(
    fetcher: Arc<F>,
    request: &FetchBatchRequest,
) -> Result<BatchSummary, RequestError>
where
    F: Fetcher + 'static,
{
    let options = BatchOptions {
        extract_content: request.extract_content,
        include_metadata: request.include_metadata,
        timeout_secs: request.timeout,
        max_concurrent: request.max_concurrent,
    };
    Ok(batch::fetch_all(fetcher, &request.urls, &options).await)
}

/// Successful search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub url: String,
    pub search_terms: Vec<String>,
    pub total_matches: usize,
    pub matches: Vec<SearchMatch>,
    pub content_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Success(SearchResponse),
    Failure(OpFailure),
}

/// Fetch a page, extract its main content, and scan it for the given terms.
pub async fn search_webpage_content<F>(
    fetcher: &F,
    request: &SearchRequest,
) -> Result<SearchResult, RequestError>
where
    F: Fetcher + ?Sized,
{
    require_url(&request.url)?;

    let mut page_request = FetchPageRequest::new(request.url.clone());
    page_request.include_metadata = false;

    match fetch_page(fetcher, &page_request).await {
        PageResult::Failure(failure) => Ok(SearchResult::Failure(failure)),
        PageResult::Success(page) => {
            let content = page.content.unwrap_or_default();
            let matches = search_content(
                &content,
                &request.search_terms,
                request.case_sensitive,
                request.context_chars,
            );
            Ok(SearchResult::Success(SearchResponse {
                url: request.url.clone(),
                search_terms: request.search_terms.clone(),
                total_matches: matches.len(),
                matches,
                content_length: content.len(),
            }))
        }
    }
}

/// Structured failure for link extraction, keyed by the source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinksFailure {
    pub source_url: String,
    pub error: String,
    pub status: String,
}

/// Successful link-extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinksResponse {
    pub source_url: String,
    pub total_links: usize,
    pub internal_count: usize,
    pub external_count: usize,
    pub links: Vec<webfetch_core::LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinksResult {
    Success(LinksResponse),
    Failure(LinksFailure),
}

/// Fetch a page and classify every hyperlink on it.
pub async fn extract_links<F>(
    fetcher: &F,
    request: &LinksRequest,
) -> Result<LinksResult, RequestError>
where
    F: Fetcher + ?Sized,
{
    require_url(&request.url)?;

    let outcome = fetcher.fetch(&request.url, None).await;
    let page = match outcome {
        FetchOutcome::Success(page) => page,
        FetchOutcome::Failure(failure) => {
            return Ok(LinksResult::Failure(LinksFailure {
                source_url: request.url.clone(),
                error: failure.to_string(),
                status: "failed".to_string(),
            }));
        }
    };

    let Ok(source_url) = Url::parse(&request.url) else {
        engine_warn!("unparseable source url after fetch: {}", request.url);
        return Ok(LinksResult::Failure(LinksFailure {
            source_url: request.url.clone(),
            error: "invalid input: unparseable source url".to_string(),
            status: "failed".to_string(),
        }));
    };

    let filters = LinkFilters {
        internal_only: request.filter_internal,
        external_only: request.filter_external,
        include_anchors: request.include_anchors,
    };
    let links = webfetch_core::extract_links(&page.body, &source_url, filters);
    let internal_count = links.iter().filter(|link| link.is_internal).count();
    let external_count = links.iter().filter(|link| link.is_external).count();

    Ok(LinksResult::Success(LinksResponse {
        source_url: request.url.clone(),
        total_links: links.len(),
        internal_count,
        external_count,
        links,
    }))
}

/// Successful metadata result: the flattened field set plus response facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataResponse {
    #[serde(flatten)]
    pub metadata: PageMetadata,
    pub url: String,
    pub status_code: u16,
    pub content_type: String,
    pub content_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataResult {
    Success(MetadataResponse),
    Failure(OpFailure),
}

/// Fetch a page and extract its head-level metadata.
pub async fn get_page_metadata<F>(
    fetcher: &F,
    request: &MetadataRequest,
) -> Result<MetadataResult, RequestError>
where
    F: Fetcher + ?Sized,
{
    require_url(&request.url)?;

    match fetcher.fetch(&request.url, None).await {
        FetchOutcome::Success(page) => Ok(MetadataResult::Success(MetadataResponse {
            metadata: extract_metadata(&page.body),
            url: request.url.clone(),
            status_code: page.status_code,
            content_type: page.content_type.clone().unwrap_or_default(),
            content_length: page.body.len(),
        })),
        FetchOutcome::Failure(failure) => Ok(MetadataResult::Failure(OpFailure::new(
            &request.url,
            failure.to_string(),
        ))),
    }
}

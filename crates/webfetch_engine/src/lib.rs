//! Webfetch engine: HTTP retrieval, batch fan-out, and the typed operation
//! surface consumed by transport layers.
mod batch;
mod decode;
mod fetch;
mod ops;

pub use batch::{fetch_all, BatchOptions, BatchSummary};
pub use decode::decode_body;
pub use fetch::{FetchSettings, Fetcher, HttpFetcher};
pub use ops::{
    extract_links, fetch_multiple_pages, fetch_webpage, get_page_metadata,
    search_webpage_content, FetchBatchRequest, FetchPageRequest, LinksFailure, LinksRequest,
    LinksResponse, LinksResult, MetadataRequest, MetadataResponse, MetadataResult, OpFailure,
    PageResult, PageSuccess, RequestError, SearchRequest, SearchResponse, SearchResult,
};

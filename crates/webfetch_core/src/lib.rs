//! Webfetch core: pure document-derivation logic.
//!
//! Everything in this crate is a function of already-fetched document text.
//! Network retrieval lives in `webfetch_engine`; the types here carry its
//! results downstream.
mod content;
mod links;
mod metadata;
mod search;
mod types;

pub use content::{extract_content, ExtractedContent};
pub use links::{extract_links, LinkFilters, LinkRecord};
pub use metadata::{extract_metadata, PageMetadata};
pub use search::{search_content, SearchMatch};
pub use types::{FailureKind, FetchFailure, FetchOutcome, FetchSuccess};

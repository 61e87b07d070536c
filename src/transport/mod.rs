//! Transport module for issuing single request/response cycles
//!
//! This module contains:
//! - The raw HTTP seam and its reqwest implementation
//! - The persisted-query GET with full-query POST fallback
//! - HTML fetching with deterministic DOM pruning

mod client;
mod fetcher;
mod prune;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    build_http_client, HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestClient,
    ACCEPT_HTML, ACCEPT_JSON,
};
pub use fetcher::{FetchResult, Transport, PERSISTED_QUERY_NOT_FOUND};
pub use prune::prune_html;

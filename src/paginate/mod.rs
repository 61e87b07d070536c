//! Paginator module for walking paginated sources to completion
//!
//! Three strategies are supported:
//! - Cursor-based JSON pagination (`pageInfo.endCursor` / `hasNextPage`)
//! - Key-based AJAX pagination (opaque continuation key in the markup)
//! - Count-discovery AJAX pagination (first page reveals the page count)
//!
//! Every individual fetch goes through the [`SourceCache`], and every fetched
//! page is reported to the [`ProgressTree`] as one request of one step.

mod count;
mod cursor;
mod key;

use crate::cache::{CacheEntry, RequestKey, SourceCache};
use crate::catalog::{page_url, AjaxListing, JsonQuery};
use crate::config::Config;
use crate::progress::{OperationHandle, ProgressTree, StepHandle};
use crate::transport::{FetchResult, Transport};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use count::page_count;
pub use cursor::{read_page, CursorPage};
pub use key::continuation_key;

/// One raw item handed to the extractor
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    /// A JSON edge node
    Json(Value),

    /// A pruned HTML page or fragment
    Html(Arc<str>),
}

impl RawNode {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Html(_) => None,
        }
    }

    pub fn as_html(&self) -> Option<&str> {
        match self {
            Self::Html(html) => Some(html),
            Self::Json(_) => None,
        }
    }
}

/// Which pagination strategy drives a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    /// Cursor-based JSON pagination of a persisted query
    Cursor(JsonQuery),

    /// AJAX pages chained by a continuation key
    Keyed(AjaxListing),

    /// AJAX pages `1..=N` where the first page reveals `N`
    Counted(AjaxListing),
}

impl Pagination {
    /// Step type label and parameter for progress records
    fn step_labels(&self) -> (String, Option<String>) {
        match self {
            Self::Cursor(query) => (
                query.operation.label().to_string(),
                query.parameter.as_ref().map(|p| p.label()),
            ),
            Self::Keyed(listing) | Self::Counted(listing) => (listing.label().to_string(), None),
        }
    }
}

/// Drives repeated transport calls until a stream is exhausted
pub struct Paginator<'a> {
    transport: &'a Transport,
    cache: &'a SourceCache,
    progress: &'a ProgressTree,
    config: &'a Config,
    cancel: CancellationToken,
}

impl<'a> Paginator<'a> {
    pub fn new(
        transport: &'a Transport,
        cache: &'a SourceCache,
        progress: &'a ProgressTree,
        config: &'a Config,
    ) -> Self {
        Self {
            transport,
            cache,
            progress,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops pagination before the next page once the token is cancelled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Walks one stream to completion as a new step of `operation`
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key such as `tt0068646`
    /// * `pagination` - Strategy and source of the stream
    /// * `max_pages` - Page cap; 0 means follow the server until it reports completion
    /// * `operation` - Operation the new step is appended to
    ///
    /// # Returns
    ///
    /// Raw nodes in page order. Failures end the stream early and yield
    /// whatever was gathered before them.
    pub async fn paginate(
        &self,
        entity_id: &str,
        pagination: &Pagination,
        max_pages: u32,
        operation: OperationHandle,
    ) -> Vec<RawNode> {
        let (kind, parameter) = pagination.step_labels();
        let step = self
            .progress
            .start_step(operation, &kind, parameter.as_deref(), 1);

        let (nodes, requests) = match pagination {
            Pagination::Cursor(query) => {
                cursor::paginate(self, entity_id, query, max_pages, step).await
            }
            Pagination::Keyed(listing) => {
                key::paginate(self, entity_id, *listing, max_pages, step).await
            }
            Pagination::Counted(listing) => {
                count::paginate(self, entity_id, *listing, max_pages, step).await
            }
        };

        self.progress.update_step(step, requests, requests);
        tracing::debug!(
            entity = %entity_id,
            step = %kind,
            requests,
            nodes = nodes.len(),
            "Pagination finished"
        );
        nodes
    }

    /// Fetches one full HTML page as a single-request step of `operation`
    pub async fn fetch_page(
        &self,
        entity_id: &str,
        page: &str,
        operation: OperationHandle,
    ) -> Option<Arc<str>> {
        let step = self.progress.start_step(operation, "page", Some(page), 1);
        let url = page_url(&self.config.site.base_url, entity_id, page);
        let html = self.html(RequestKey::html(entity_id, page), &url).await;
        self.progress.update_step(step, 1, 1);
        html
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn report(&self, step: StepHandle, finished: u32, total: u32) {
        self.progress.update_step(step, finished, total);
    }

    /// Cache-through JSON fetch. Failures are not cached.
    async fn json(
        &self,
        key: RequestKey,
        query: &JsonQuery,
        after: Option<&str>,
    ) -> Option<Arc<Value>> {
        if let Some(value) = self.cache.lookup(&key).and_then(|e| e.as_json().cloned()) {
            // A hit does no I/O; yield so a long cached walk stays cooperative
            tokio::task::yield_now().await;
            return Some(value);
        }

        let variables = query.variables(
            &key.entity_id,
            self.config.pagination.page_size,
            &self.config.site.locale,
            after,
        );

        match self.transport.fetch_json(query.operation, &variables).await {
            FetchResult::Success(value) => self
                .cache
                .store(key, CacheEntry::Json(Arc::new(value)))
                .as_json()
                .cloned(),
            failure => {
                tracing::warn!(key = %key, result = ?failure, "JSON page unavailable");
                None
            }
        }
    }

    /// Cache-through HTML fetch. Failures are not cached.
    async fn html(&self, key: RequestKey, url: &str) -> Option<Arc<str>> {
        if let Some(html) = self.cache.lookup(&key).and_then(|e| e.as_html().cloned()) {
            tokio::task::yield_now().await;
            return Some(html);
        }

        match self.transport.fetch_html(url).await {
            FetchResult::Success(html) => self
                .cache
                .store(key, CacheEntry::Html(Arc::from(html)))
                .as_html()
                .cloned(),
            failure => {
                tracing::warn!(key = %key, result = ?failure, "HTML page unavailable");
                None
            }
        }
    }

    fn ajax_url(&self, entity_id: &str, subpath: &str) -> String {
        page_url(&self.config.site.base_url, entity_id, subpath)
    }
}

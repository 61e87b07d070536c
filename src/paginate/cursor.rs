//! Cursor-based JSON pagination
//!
//! Each response exposes `pageInfo { endCursor hasNextPage }` on the
//! connection object. The stream ends when the server says there is no next
//! page, when the cursor is missing or malformed, when a cursor already
//! requested in this chain comes back, when the page cap is reached, or when
//! a page cannot be fetched.

use crate::cache::RequestKey;
use crate::catalog::JsonQuery;
use crate::paginate::{Paginator, RawNode};
use crate::progress::StepHandle;
use serde_json::Value;
use std::collections::HashSet;

/// Nodes and pagination metadata read from one JSON page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorPage {
    pub nodes: Vec<Value>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
    /// Total edge count, when the connection reports one
    pub total: Option<u64>,
}

impl CursorPage {
    /// Cursor of the next page, or `None` when pagination must stop
    fn next_cursor(&self) -> Option<&str> {
        if !self.has_next_page {
            return None;
        }
        self.end_cursor.as_deref().filter(|cursor| !cursor.is_empty())
    }
}

/// Reads the connection at `path` out of a response body
///
/// Missing or mistyped fields read as "no nodes, no next page".
pub fn read_page(body: &Value, path: &[&str]) -> CursorPage {
    let connection = path.iter().try_fold(body, |value, field| value.get(field));
    let Some(connection) = connection else {
        return CursorPage::default();
    };

    let nodes = connection
        .get("edges")
        .and_then(Value::as_array)
        .map(|edges| {
            edges
                .iter()
                .map(|edge| edge.get("node").unwrap_or(edge).clone())
                .collect()
        })
        .unwrap_or_default();

    let page_info = connection.get("pageInfo");
    let has_next_page = page_info
        .and_then(|info| info.get("hasNextPage"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let end_cursor = page_info
        .and_then(|info| info.get("endCursor"))
        .and_then(Value::as_str)
        .map(str::to_string);

    CursorPage {
        nodes,
        has_next_page,
        end_cursor,
        total: connection.get("total").and_then(Value::as_u64),
    }
}

/// Walks a persisted query's cursor chain. Returns the nodes and the number
/// of pages requested.
pub(super) async fn paginate(
    paginator: &Paginator<'_>,
    entity_id: &str,
    query: &JsonQuery,
    max_pages: u32,
    step: StepHandle,
) -> (Vec<RawNode>, u32) {
    let path = query.operation.connection_path();
    let page_size = u64::from(paginator.config.pagination.page_size.max(1));

    let mut nodes = Vec::new();
    let mut pages = 0u32;
    let mut cursor: Option<String> = None;
    let mut requested: HashSet<String> = HashSet::new();

    loop {
        if paginator.is_cancelled() {
            tracing::info!(entity = %entity_id, query = %query.label(), "Pagination cancelled");
            break;
        }

        let key = RequestKey::json(entity_id, query, cursor.as_deref());
        let Some(body) = paginator.json(key, query, cursor.as_deref()).await else {
            break;
        };
        pages += 1;

        let page = read_page(&body, &path);
        nodes.extend(page.nodes.iter().cloned().map(RawNode::Json));

        let next = match page.next_cursor() {
            Some(next) if requested.contains(next) => {
                tracing::warn!(entity = %entity_id, cursor = %next, "Cursor repeated, stopping");
                None
            }
            next => next,
        };

        let capped = max_pages != 0 && pages >= max_pages;
        match next {
            Some(next) if !capped => {
                paginator.report(step, pages, estimate_pages(&page, pages, page_size, max_pages));
                requested.insert(next.to_string());
                cursor = Some(next.to_string());
            }
            _ => break,
        }
    }

    (nodes, pages)
}

/// Estimated total page count while more pages remain
///
/// Uses the connection's reported total when present; otherwise assumes one
/// more page than fetched so far.
fn estimate_pages(page: &CursorPage, pages: u32, page_size: u64, max_pages: u32) -> u32 {
    let from_total = page
        .total
        .map(|total| u32::try_from(total.div_ceil(page_size)).unwrap_or(u32::MAX));

    let mut estimate = from_total.unwrap_or(0).max(pages + 1);
    if max_pages != 0 {
        estimate = estimate.min(max_pages);
    }
    estimate.max(pages + 1)
}

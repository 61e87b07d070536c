//! Count-discovery AJAX pagination
//!
//! The first page's markup reveals how many pages exist (one option per
//! season in the season picker). Pages `2..=N` are then requested in order.
//! When discovery fails exactly one page is assumed. A failed page is
//! skipped rather than ending the stream, since later pages do not depend
//! on it.

use crate::cache::RequestKey;
use crate::catalog::{AjaxListing, SEASON_OPTION_SELECTOR};
use crate::paginate::{Paginator, RawNode};
use crate::progress::StepHandle;
use scraper::{Html, Selector};

/// Number of pages announced by a first page, if any
pub fn page_count(html: &str) -> Option<u32> {
    let selector = Selector::parse(SEASON_OPTION_SELECTOR).ok()?;
    let document = Html::parse_document(html);
    let count = document.select(&selector).count();
    u32::try_from(count).ok().filter(|count| *count > 0)
}

/// Requests every announced page. Returns the pages and the number of requests.
pub(super) async fn paginate(
    paginator: &Paginator<'_>,
    entity_id: &str,
    listing: AjaxListing,
    max_pages: u32,
    step: StepHandle,
) -> (Vec<RawNode>, u32) {
    let mut nodes = Vec::new();

    if paginator.is_cancelled() {
        return (nodes, 0);
    }

    let Some(first) = fetch(paginator, entity_id, listing, 1).await else {
        return (nodes, 1);
    };

    let mut total = page_count(&first).unwrap_or_else(|| {
        tracing::debug!(
            entity = %entity_id,
            listing = listing.label(),
            "No page count found, assuming one page"
        );
        1
    });
    if max_pages != 0 {
        total = total.min(max_pages);
    }

    nodes.push(RawNode::Html(first));
    let mut requests = 1u32;
    paginator.report(step, requests, total);

    for page in 2..=total {
        if paginator.is_cancelled() {
            tracing::info!(entity = %entity_id, listing = listing.label(), "Pagination cancelled");
            break;
        }

        if let Some(html) = fetch(paginator, entity_id, listing, page).await {
            nodes.push(RawNode::Html(html));
        }
        requests += 1;
        paginator.report(step, requests, total);
    }

    (nodes, requests)
}

async fn fetch(
    paginator: &Paginator<'_>,
    entity_id: &str,
    listing: AjaxListing,
    page: u32,
) -> Option<std::sync::Arc<str>> {
    let subpath = listing.page_subpath(Some(&page.to_string()));
    let url = paginator.ajax_url(entity_id, &subpath);
    paginator.html(RequestKey::ajax(entity_id, &subpath), &url).await
}

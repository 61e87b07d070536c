//! Key-based AJAX pagination
//!
//! Each fragment embeds an opaque continuation key in an HTML attribute. The
//! next page is requested with that key. The stream ends when the key is
//! missing or empty, when it repeats any key already requested (stall or
//! cycle), when the page cap is reached, or when a page cannot be fetched.

use crate::cache::RequestKey;
use crate::catalog::{AjaxListing, CONTINUATION_KEY_ATTR, CONTINUATION_KEY_SELECTOR};
use crate::paginate::{Paginator, RawNode};
use crate::progress::StepHandle;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Reads the continuation key out of a fragment
pub fn continuation_key(html: &str) -> Option<String> {
    let selector = Selector::parse(CONTINUATION_KEY_SELECTOR).ok()?;
    let document = Html::parse_document(html);

    let key = document
        .select(&selector)
        .filter_map(|element| element.value().attr(CONTINUATION_KEY_ATTR))
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string);
    key
}

/// Follows continuation keys. Returns the pages and the number of requests.
pub(super) async fn paginate(
    paginator: &Paginator<'_>,
    entity_id: &str,
    listing: AjaxListing,
    max_pages: u32,
    step: StepHandle,
) -> (Vec<RawNode>, u32) {
    let mut nodes = Vec::new();
    let mut pages = 0u32;
    let mut key: Option<String> = None;
    let mut requested: HashSet<String> = HashSet::new();

    loop {
        if paginator.is_cancelled() {
            tracing::info!(entity = %entity_id, listing = listing.label(), "Pagination cancelled");
            break;
        }

        let subpath = listing.page_subpath(key.as_deref());
        let url = paginator.ajax_url(entity_id, &subpath);
        let Some(html) = paginator.html(RequestKey::ajax(entity_id, &subpath), &url).await else {
            break;
        };
        pages += 1;

        let next = continuation_key(&html);
        nodes.push(RawNode::Html(html));

        let capped = max_pages != 0 && pages >= max_pages;
        match next {
            Some(next) if requested.contains(&next) => {
                tracing::warn!(
                    entity = %entity_id,
                    key = %next,
                    "Continuation key repeated, stopping"
                );
                break;
            }
            Some(next) if !capped => {
                paginator.report(step, pages, pages + 1);
                requested.insert(next.clone());
                key = Some(next);
            }
            _ => break,
        }
    }

    (nodes, pages)
}

//! Deterministic DOM pruning
//!
//! Strips nodes that only matter to a browser (scripts, styles, frames,
//! inline SVG, comments) so extraction code sees content markup only.
//! JSON data islands (`application/ld+json`, `application/json`) are
//! content and survive. Pruning is pure and idempotent.

use scraper::{ElementRef, Html, Selector};

const PRUNED_ELEMENTS: &str = "script, style, iframe, noscript, svg, template, \
    link[rel~='stylesheet'], link[rel='preload'], link[rel='prefetch']";

/// Removes presentation-only nodes and re-serializes the document
///
/// # Example
///
/// ```
/// use reel_harvest::transport::prune_html;
///
/// let pruned = prune_html("<html><body><script>x()</script><p>Hi</p></body></html>");
/// assert!(!pruned.contains("script"));
/// assert!(pruned.contains("<p>Hi</p>"));
/// ```
pub fn prune_html(html: &str) -> String {
    let mut document = Html::parse_document(html);

    let mut doomed = Vec::new();

    if let Ok(selector) = Selector::parse(PRUNED_ELEMENTS) {
        doomed.extend(
            document
                .select(&selector)
                .filter(|element| !is_data_island(element))
                .map(|element| element.id()),
        );
    }

    doomed.extend(
        document
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_comment())
            .map(|node| node.id()),
    );

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.html()
}

fn is_data_island(element: &ElementRef) -> bool {
    element.value().name() == "script"
        && matches!(
            element.value().attr("type"),
            Some("application/ld+json") | Some("application/json")
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>The Godfather</title><style>p{}</style><link rel="stylesheet" href="/a.css"><script src="/app.js"></script><script type="application/ld+json">{"name":"The Godfather"}</script></head><body><!-- ad slot --><iframe src="/ad"></iframe><noscript>enable js</noscript><div class="plot"><svg><path d="M0"/></svg><p>A crime saga.</p></div></body></html>"#;

    #[test]
    fn test_strips_presentation_nodes() {
        let pruned = prune_html(PAGE);
        assert!(!pruned.contains("/app.js"));
        assert!(!pruned.contains("<style"));
        assert!(!pruned.contains("stylesheet"));
        assert!(!pruned.contains("<iframe"));
        assert!(!pruned.contains("enable js"));
        assert!(!pruned.contains("<svg"));
        assert!(!pruned.contains("ad slot"));
    }

    #[test]
    fn test_keeps_content_and_data_islands() {
        let pruned = prune_html(PAGE);
        assert!(pruned.contains("<title>The Godfather</title>"));
        assert!(pruned.contains("<p>A crime saga.</p>"));
        assert!(pruned.contains(r#"{"name":"The Godfather"}"#));
    }

    #[test]
    fn test_idempotent() {
        let once = prune_html(PAGE);
        let twice = prune_html(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fragment_is_wrapped_in_document() {
        let pruned = prune_html(r#"<div class="lister-item">Great film</div><script>x</script>"#);
        assert!(pruned.contains(r#"<div class="lister-item">Great film</div>"#));
        assert!(!pruned.contains("<script"));
    }
}

//! Catalog vocabulary
//!
//! Closed enums for every JSON operation, category partition and AJAX
//! listing the engine knows how to fetch, and URL construction for
//! catalog entity pages.

mod category;
mod listing;
mod operation;

pub use category::{AwardEvent, CompanyCreditCategory, ConnectionCategory};
pub use listing::{
    AjaxListing, CONTINUATION_KEY_ATTR, CONTINUATION_KEY_SELECTOR, SEASON_OPTION_SELECTOR,
};
pub use operation::{JsonQuery, Operation, Parameter};

/// Returns the URL path segment for an entity id, based on its prefix
///
/// `tt` ids live under `title`, `nm` under `name`, `co` under `company`
/// and `ev` under `event`. Anything else is treated as a title.
pub fn entity_segment(entity_id: &str) -> &'static str {
    match entity_id.get(..2) {
        Some("nm") => "name",
        Some("co") => "company",
        Some("ev") => "event",
        _ => "title",
    }
}

/// Builds `<base>/<segment>/<id>/<subpath>`
pub fn page_url(base_url: &str, entity_id: &str, subpath: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        entity_segment(entity_id),
        entity_id,
        subpath.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_segment() {
        assert_eq!(entity_segment("tt0068646"), "title");
        assert_eq!(entity_segment("nm0000008"), "name");
        assert_eq!(entity_segment("co0023400"), "company");
        assert_eq!(entity_segment("x"), "title");
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            page_url("https://www.imdb.com/", "tt0068646", "/reviews/_ajax"),
            "https://www.imdb.com/title/tt0068646/reviews/_ajax"
        );
        assert_eq!(
            page_url("https://www.imdb.com", "tt0068646", ""),
            "https://www.imdb.com/title/tt0068646/"
        );
    }
}

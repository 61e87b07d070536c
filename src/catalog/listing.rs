//! AJAX partial-page listings and where their pagination hints live

/// A listing served as HTML fragments from an `_ajax` sub-path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AjaxListing {
    /// User reviews, paged by an opaque continuation key
    Reviews,
    /// Episodes, one page per season
    Episodes,
}

impl AjaxListing {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::Episodes => "episodes",
        }
    }

    /// Sub-path below the entity page, without query string
    pub fn subpath(&self) -> &'static str {
        match self {
            Self::Reviews => "reviews/_ajax",
            Self::Episodes => "episodes/_ajax",
        }
    }

    /// Query parameter carrying the continuation key or page number
    pub fn page_param(&self) -> &'static str {
        match self {
            Self::Reviews => "paginationKey",
            Self::Episodes => "season",
        }
    }

    /// Sub-path for one page. `None` requests the first page.
    pub fn page_subpath(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => {
                let token: String =
                    url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
                format!("{}?{}={}", self.subpath(), self.page_param(), token)
            }
            None => self.subpath().to_string(),
        }
    }
}

/// Element and attribute holding the reviews continuation key
pub const CONTINUATION_KEY_SELECTOR: &str = ".load-more-data[data-key]";
pub const CONTINUATION_KEY_ATTR: &str = "data-key";

/// Options of the season picker; one option per season page
pub const SEASON_OPTION_SELECTOR: &str = "select#bySeason option";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_no_query() {
        assert_eq!(AjaxListing::Reviews.page_subpath(None), "reviews/_ajax");
    }

    #[test]
    fn test_keyed_page() {
        assert_eq!(
            AjaxListing::Reviews.page_subpath(Some("g4xolermtiqhejcxxxgs753i36t52q343")),
            "reviews/_ajax?paginationKey=g4xolermtiqhejcxxxgs753i36t52q343"
        );
        assert_eq!(AjaxListing::Episodes.page_subpath(Some("3")), "episodes/_ajax?season=3");
    }

    #[test]
    fn test_key_is_url_encoded() {
        assert_eq!(
            AjaxListing::Reviews.page_subpath(Some("a b&c")),
            "reviews/_ajax?paginationKey=a+b%26c"
        );
    }
}

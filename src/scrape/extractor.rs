//! Hand-off point between the fetch engine and field extraction

use crate::paginate::RawNode;
use std::fmt;

/// Catalog attribute a façade call gathers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    FilmingDates,
    FilmingLocations,
    News,
    Quotes,
    Trivia,
    Goofs,
    Awards,
    CompanyCredits,
    Connections,
    Reviews,
    Episodes,
    Page,
}

impl Attribute {
    /// Description used for progress records
    pub fn description(&self) -> &'static str {
        match self {
            Self::FilmingDates => "all filming dates",
            Self::FilmingLocations => "all filming locations",
            Self::News => "all news",
            Self::Quotes => "all quotes",
            Self::Trivia => "all trivia",
            Self::Goofs => "all goofs",
            Self::Awards => "all awards",
            Self::CompanyCredits => "all company credits",
            Self::Connections => "all connections",
            Self::Reviews => "all user reviews",
            Self::Episodes => "all episodes",
            Self::Page => "page",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Raw nodes of one sub-stream (one category, one award event, one page)
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub label: String,
    pub nodes: Vec<RawNode>,
}

/// Everything one façade call fetched, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct Scraped {
    pub entity_id: String,
    pub attribute: Attribute,
    pub batches: Vec<Batch>,
}

impl Scraped {
    /// All nodes of all batches, concatenated
    pub fn nodes(&self) -> impl Iterator<Item = &RawNode> {
        self.batches.iter().flat_map(|batch| batch.nodes.iter())
    }

    pub fn node_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.nodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Nodes of the batch with the given label
    pub fn batch(&self, label: &str) -> Option<&Batch> {
        self.batches.iter().find(|batch| batch.label == label)
    }
}

/// Turns raw fetched nodes into a typed record
///
/// Returning `None` means "no data"; it is never an error.
pub trait Extractor<T>: Send + Sync {
    fn extract(&self, scraped: &Scraped) -> Option<T>;
}

impl<T, F> Extractor<T> for F
where
    F: Fn(&Scraped) -> Option<T> + Send + Sync,
{
    fn extract(&self, scraped: &Scraped) -> Option<T> {
        self(scraped)
    }
}

/// Extractor returning the raw bundle untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct RawNodes;

impl Extractor<Scraped> for RawNodes {
    fn extract(&self, scraped: &Scraped) -> Option<Scraped> {
        Some(scraped.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn scraped() -> Scraped {
        Scraped {
            entity_id: "tt0068646".to_string(),
            attribute: Attribute::Connections,
            batches: vec![
                Batch {
                    label: "Follows".to_string(),
                    nodes: vec![RawNode::Json(json!(1)), RawNode::Json(json!(2))],
                },
                Batch {
                    label: "Followed by".to_string(),
                    nodes: vec![RawNode::Html(Arc::from("<p/>"))],
                },
            ],
        }
    }

    #[test]
    fn test_concatenated_view() {
        let scraped = scraped();
        assert_eq!(scraped.node_count(), 3);
        assert!(!scraped.is_empty());
        assert_eq!(scraped.nodes().filter(|n| n.as_json().is_some()).count(), 2);
        assert_eq!(scraped.batch("Followed by").unwrap().nodes.len(), 1);
        assert!(scraped.batch("Remake of").is_none());
    }

    #[test]
    fn test_closure_extractor() {
        let count = |scraped: &Scraped| Some(scraped.node_count());
        assert_eq!(count.extract(&scraped()), Some(3));
    }

    #[test]
    fn test_raw_nodes_extractor() {
        assert_eq!(RawNodes.extract(&scraped()), Some(scraped()));
    }
}

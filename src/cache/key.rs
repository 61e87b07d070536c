use crate::catalog::JsonQuery;
use std::fmt;

/// What kind of side-effect-free fetch a key stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// A full HTML page, e.g. `""` for the main page or `releaseinfo`
    Html { page: String },

    /// An AJAX fragment, including its query string
    Ajax { subpath: String },

    /// One page of a persisted JSON query; `after` is the cursor the page
    /// was requested with, `None` for the first page
    Json {
        query: JsonQuery,
        after: Option<String>,
    },
}

/// Uniquely identifies one logical fetch for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub entity_id: String,
    pub kind: RequestKind,
}

impl RequestKey {
    pub fn html(entity_id: &str, page: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            kind: RequestKind::Html {
                page: page.to_string(),
            },
        }
    }

    pub fn ajax(entity_id: &str, subpath: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            kind: RequestKind::Ajax {
                subpath: subpath.to_string(),
            },
        }
    }

    pub fn json(entity_id: &str, query: &JsonQuery, after: Option<&str>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            kind: RequestKind::Json {
                query: query.clone(),
                after: after.map(str::to_string),
            },
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RequestKind::Html { page } => write!(f, "{} html:{}", self.entity_id, page),
            RequestKind::Ajax { subpath } => write!(f, "{} ajax:{}", self.entity_id, subpath),
            RequestKind::Json { query, after } => write!(
                f,
                "{} json:{} after={}",
                self.entity_id,
                query.label(),
                after.as_deref().unwrap_or("-")
            ),
        }
    }
}

//! Persisted JSON operations and the variables they are called with

use crate::catalog::category::{AwardEvent, CompanyCreditCategory, ConnectionCategory};
use serde_json::{json, Map, Value};
use std::fmt;

/// A paginated JSON operation exposed by the upstream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FilmingDates,
    FilmingLocations,
    News,
    Awards,
    CompanyCredits,
    Connections,
    Quotes,
    Trivia,
    Goofs,
}

impl Operation {
    /// Upstream operation name, also the key into the persisted-query table
    pub fn name(&self) -> &'static str {
        match self {
            Self::FilmingDates => "TitleFilmingDatesPaginated",
            Self::FilmingLocations => "TitleFilmingLocationsPaginated",
            Self::News => "TitleNewsPagination",
            Self::Awards => "TitleAwardsSubPagePagination",
            Self::CompanyCredits => "TitleCompanyCreditsPagination",
            Self::Connections => "TitleConnectionsSubPagePagination",
            Self::Quotes => "TitleQuotesPagination",
            Self::Trivia => "TitleTriviaPagination",
            Self::Goofs => "TitleGoofsPagination",
        }
    }

    /// Human readable label used in progress records
    pub fn label(&self) -> &'static str {
        match self {
            Self::FilmingDates => "filming dates",
            Self::FilmingLocations => "filming locations",
            Self::News => "news",
            Self::Awards => "awards",
            Self::CompanyCredits => "company credits",
            Self::Connections => "connections",
            Self::Quotes => "quotes",
            Self::Trivia => "trivia",
            Self::Goofs => "goofs",
        }
    }

    /// JSON path from the response root to the paginated connection object
    pub fn connection_path(&self) -> [&'static str; 3] {
        let field = match self {
            Self::FilmingDates => "filmingDates",
            Self::FilmingLocations => "filmingLocations",
            Self::News => "news",
            Self::Awards => "awardNominations",
            Self::CompanyCredits => "companyCredits",
            Self::Connections => "connections",
            Self::Quotes => "quotes",
            Self::Trivia => "trivia",
            Self::Goofs => "goofs",
        };
        ["data", "title", field]
    }

    /// True when results are fetched one category or event at a time
    pub fn is_partitioned(&self) -> bool {
        matches!(self, Self::Awards | Self::CompanyCredits | Self::Connections)
    }

    /// Returns all operations
    pub fn all() -> [Self; 9] {
        [
            Self::FilmingDates,
            Self::FilmingLocations,
            Self::News,
            Self::Awards,
            Self::CompanyCredits,
            Self::Connections,
            Self::Quotes,
            Self::Trivia,
            Self::Goofs,
        ]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The filter partitioning an operation's results, if any
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    Connection(ConnectionCategory),
    CompanyCredit(CompanyCreditCategory),
    AwardEvent(AwardEvent),
}

impl Parameter {
    /// Display label for progress records
    pub fn label(&self) -> String {
        match self {
            Self::Connection(category) => category.label().to_string(),
            Self::CompanyCredit(category) => category.label().to_string(),
            Self::AwardEvent(event) => event.to_string(),
        }
    }

    /// The `filter` variable sent upstream
    fn filter(&self) -> Value {
        match self {
            Self::Connection(category) => json!({ "categories": [category.api_id()] }),
            Self::CompanyCredit(category) => json!({ "categories": [category.api_id()] }),
            Self::AwardEvent(event) => json!({ "events": [event.as_str()] }),
        }
    }
}

/// One logical JSON query: an operation and its optional partition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonQuery {
    pub operation: Operation,
    pub parameter: Option<Parameter>,
}

impl JsonQuery {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            parameter: None,
        }
    }

    pub fn with_parameter(operation: Operation, parameter: Parameter) -> Self {
        Self {
            operation,
            parameter: Some(parameter),
        }
    }

    /// Builds the variables object for one page of this query
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key such as `tt0068646`
    /// * `page_size` - Number of edges requested
    /// * `locale` - Locale for localized fields
    /// * `after` - Cursor of the previous page, `None` for the first page
    pub fn variables(
        &self,
        entity_id: &str,
        page_size: u32,
        locale: &str,
        after: Option<&str>,
    ) -> Value {
        let mut variables = Map::new();
        variables.insert("const".to_string(), json!(entity_id));
        variables.insert("first".to_string(), json!(page_size));
        variables.insert("locale".to_string(), json!(locale));
        if let Some(cursor) = after {
            variables.insert("after".to_string(), json!(cursor));
        }
        if let Some(parameter) = &self.parameter {
            variables.insert("filter".to_string(), parameter.filter());
        }
        Value::Object(variables)
    }

    /// Step label used in progress records
    pub fn label(&self) -> String {
        match &self.parameter {
            Some(parameter) => format!("{} / {}", self.operation.label(), parameter.label()),
            None => self.operation.label().to_string(),
        }
    }
}

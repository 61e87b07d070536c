//! Transport: one logical fetch per call
//!
//! JSON operations are fetched with the two-protocol persisted-query
//! exchange:
//!
//! | Attempt | Request | Carries |
//! |---------|---------|---------|
//! | 1 | GET | operation name, variables, persisted-query hash |
//! | 2 | POST | the same payload plus the literal query text |
//!
//! The POST is sent only when the GET fails at the HTTP level or its body
//! contains `PersistedQueryNotFound`. HTML pages are a single GET whose body
//! is pruned before it is returned.

use crate::catalog::Operation;
use crate::config::{Config, PersistedQuery, QueryTable};
use crate::transport::client::{HttpClient, HttpRequest, HttpResponse, ACCEPT_HTML, ACCEPT_JSON};
use crate::transport::prune::prune_html;
use crate::ScrapeError;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// Body marker returned when the endpoint does not know a query hash
pub const PERSISTED_QUERY_NOT_FOUND: &str = "PersistedQueryNotFound";

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
    /// Successfully fetched
    Success(T),

    /// Upstream answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body)
    NetworkError {
        /// Error description
        error: String,
    },

    /// The response arrived but could not be used
    Malformed {
        /// Error description
        error: String,
    },

    /// No persisted query is registered for the operation
    UnknownOperation {
        operation: &'static str,
    },
}

impl<T> FetchResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into the fetched value, discarding the failure reason
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Issues JSON and HTML fetches against the configured site
pub struct Transport {
    client: Arc<dyn HttpClient>,
    queries: QueryTable,
    graphql_url: Url,
}

impl Transport {
    /// Creates a transport
    ///
    /// # Arguments
    ///
    /// * `client` - Raw HTTP client
    /// * `queries` - Persisted-query table
    /// * `config` - Configuration supplying the JSON endpoint
    pub fn new(
        client: Arc<dyn HttpClient>,
        queries: QueryTable,
        config: &Config,
    ) -> Result<Self, ScrapeError> {
        Ok(Self {
            client,
            queries,
            graphql_url: Url::parse(&config.site.graphql_url)?,
        })
    }

    /// Fetches one page of a persisted JSON operation
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation to run
    /// * `variables` - Query variables, cursor included
    ///
    /// # Returns
    ///
    /// The parsed response body, or the reason no usable body was obtained
    pub async fn fetch_json(&self, operation: Operation, variables: &Value) -> FetchResult<Value> {
        let Some(query) = self.queries.get(operation.name()) else {
            tracing::error!(operation = %operation, "No persisted query registered");
            return FetchResult::UnknownOperation {
                operation: operation.name(),
            };
        };

        let extensions = json!({
            "persistedQuery": { "sha256Hash": query.sha256, "version": 1 }
        });

        match self.get_persisted(query, variables, &extensions).await {
            Ok(response) if response.is_success() && !is_unknown_hash(&response) => {
                return parse_json(&response);
            }
            Ok(response) if response.is_success() => {
                tracing::warn!(
                    operation = %operation,
                    "Persisted query hash rejected, resending full query"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    operation = %operation,
                    status = response.status,
                    "Persisted query GET failed, resending full query"
                );
            }
            Err(e) => {
                tracing::warn!(
                    operation = %operation,
                    error = %e,
                    "Persisted query GET failed, resending full query"
                );
            }
        }

        let body = json!({
            "operationName": query.operation,
            "variables": variables,
            "extensions": extensions,
            "query": query.query,
        });

        match self
            .client
            .send(HttpRequest::post_json(self.graphql_url.clone(), body))
            .await
        {
            Ok(response) if response.is_success() => parse_json(&response),
            Ok(response) => {
                tracing::warn!(
                    operation = %operation,
                    status = response.status,
                    "Full query POST failed"
                );
                FetchResult::HttpError {
                    status_code: response.status,
                }
            }
            Err(e) => {
                tracing::warn!(operation = %operation, error = %e, "Full query POST failed");
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Fetches an HTML page or AJAX fragment and prunes it
    pub async fn fetch_html(&self, url: &str) -> FetchResult<String> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return FetchResult::Malformed {
                    error: format!("invalid URL {}: {}", url, e),
                }
            }
        };

        tracing::debug!(url = %url, "GET html");

        match self.client.send(HttpRequest::get(parsed, ACCEPT_HTML)).await {
            Ok(response) if response.is_success() => {
                FetchResult::Success(prune_html(&response.body))
            }
            Ok(response) => {
                tracing::warn!(url = %url, status = response.status, "HTML fetch failed");
                FetchResult::HttpError {
                    status_code: response.status,
                }
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "HTML fetch failed");
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn get_persisted(
        &self,
        query: &PersistedQuery,
        variables: &Value,
        extensions: &Value,
    ) -> Result<HttpResponse, ScrapeError> {
        let mut url = self.graphql_url.clone();
        url.query_pairs_mut()
            .append_pair("operationName", &query.operation)
            .append_pair("variables", &serde_json::to_string(variables)?)
            .append_pair("extensions", &serde_json::to_string(extensions)?);

        tracing::debug!(operation = %query.operation, "GET persisted query");
        self.client.send(HttpRequest::get(url, ACCEPT_JSON)).await
    }
}

fn is_unknown_hash(response: &HttpResponse) -> bool {
    response.body.contains(PERSISTED_QUERY_NOT_FOUND)
}

fn parse_json(response: &HttpResponse) -> FetchResult<Value> {
    match serde_json::from_str(&response.body) {
        Ok(value) => FetchResult::Success(value),
        Err(e) => FetchResult::Malformed {
            error: e.to_string(),
        },
    }
}

//! Raw HTTP seam
//!
//! The [`HttpClient`] trait is the only place requests leave the process.
//! [`ReqwestClient`] is the production implementation; tests substitute
//! fakes that record and script responses.

use crate::config::Config;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Value of the `Accept` header
    pub accept: &'static str,
    /// JSON body, sent only with POST
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: Url, accept: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            accept,
            body: None,
        }
    }

    pub fn post_json(url: Url, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            accept: ACCEPT_JSON,
            body: Some(body),
        }
    }
}

/// Status and body of a completed response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single request/response cycle
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns its response
    ///
    /// Non-2xx statuses are returned as responses; only transport level
    /// failures (connect, timeout, body read) are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ScrapeError>;
}

/// Builds an HTTP client with the configured identity and locale headers
///
/// # Example
///
/// ```no_run
/// use reel_harvest::config::Config;
/// use reel_harvest::transport::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    if let Ok(language) = HeaderValue::from_str(&config.site.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    }

    let client = Client::builder()
        .user_agent(config.user_agent_string())
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ScrapeError> {
        let url = request.url.to_string();

        let builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => {
                let builder = self.client.post(request.url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = builder
            .header(ACCEPT, request.accept)
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| ScrapeError::Http { url, source })?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&Config::default()).is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let config = Config::default();
        let user_agent = config.user_agent_string();
        assert!(user_agent.starts_with("ReelHarvest/"));
        assert!(user_agent.ends_with(&format!("(+{})", config.user_agent.contact_url)));
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}

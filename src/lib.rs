//! Reel-Harvest: a fetch, pagination and progress engine for a media catalog
//!
//! This crate gathers raw catalog data from a website that offers no stable
//! public API. It issues HTML page requests, AJAX partial-page requests and
//! persisted JSON queries, memoizes every logical request for the lifetime of
//! the process, walks cursor and key based pagination to completion, and
//! blends the progress of every multi-step operation into one percentage.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod paginate;
pub mod progress;
pub mod scrape;
pub mod transport;

use thiserror::Error;

/// Main error type for Reel-Harvest operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid persisted query for {operation}: {reason}")]
    InvalidQuery { operation: String, reason: String },
}

/// Result type alias for Reel-Harvest operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{RequestKey, RequestKind, SourceCache};
pub use catalog::{AwardEvent, CompanyCreditCategory, ConnectionCategory, Operation};
pub use config::{Config, QueryTable};
pub use paginate::{Paginator, RawNode};
pub use progress::{ProgressLog, ProgressTree, StepRecord};
pub use scrape::{Extractor, Scraped, Scraper};
pub use transport::{FetchResult, HttpClient, Transport};

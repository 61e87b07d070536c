//! Configuration module for Reel-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and the persisted-query table the JSON transport depends on.
//!
//! # Example
//!
//! ```no_run
//! use reel_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Requesting {} edges per page", config.pagination.page_size);
//! ```

mod parser;
mod queries;
mod types;
mod validation;

// Re-export types
pub use queries::{PersistedQuery, QueryTable};
pub use types::{Config, PaginationConfig, SiteConfig, UserAgentConfig};
pub use validation::MAX_PAGE_SIZE;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::ConfigError;
use std::path::Path;

/// Loads the persisted-query table named by the configuration
///
/// Falls back to the embedded table when `queries-path` is unset.
pub fn load_queries(config: &Config) -> Result<QueryTable, ConfigError> {
    match &config.queries_path {
        Some(path) => QueryTable::load(Path::new(path)),
        None => QueryTable::embedded(),
    }
}

use serde::Deserialize;

/// Main configuration structure for Reel-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Optional path to a refreshed persisted-query table. The embedded
    /// table is used when absent.
    #[serde(rename = "queries-path", default)]
    pub queries_path: Option<String>,
}

impl Config {
    /// Formats the user agent string sent with every request
    ///
    /// Format: `Name/Version (+ContactURL)`
    pub fn user_agent_string(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.user_agent.name, self.user_agent.version, self.user_agent.contact_url
        )
    }
}

/// Upstream site endpoints and locale
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL for HTML and AJAX pages
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Endpoint for persisted JSON queries
    #[serde(rename = "graphql-url")]
    pub graphql_url: String,

    /// Locale passed in query variables
    pub locale: String,

    /// Value of the `Accept-Language` header
    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.imdb.com".to_string(),
            graphql_url: "https://caching.graphql.imdb.com/".to_string(),
            locale: "en-US".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub name: String,

    pub version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "ReelHarvest".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/reel-harvest/reel-harvest".to_string(),
        }
    }
}

/// Pagination behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Number of edges requested per JSON page (upstream caps this at 250)
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Page cap used when a façade call passes none; 0 means unbounded
    #[serde(rename = "default-max-pages")]
    pub default_max_pages: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 250,
            default_max_pages: 0,
        }
    }
}

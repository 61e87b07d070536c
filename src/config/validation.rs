use crate::config::types::{Config, PaginationConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Largest page size the upstream JSON endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 250;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_pagination_config(&config.pagination)?;
    Ok(())
}

/// Validates site endpoints and locale
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    for (name, value) in [("base-url", &config.base_url), ("graphql-url", &config.graphql_url)] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use HTTP(S), got '{}'",
                name, value
            )));
        }
    }

    if config.locale.trim().is_empty() {
        return Err(ConfigError::Validation("locale cannot be empty".to_string()));
    }

    if config.accept_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept-language cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if config.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates pagination limits
fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    Ok(())
}

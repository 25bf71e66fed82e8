use crate::config::types::{Config, CrawlerConfig, SearchConfig, SelectorsConfig, UserAgentConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_selectors_config(&config.selectors)?;
    Ok(())
}

/// Validates search engine configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Search endpoint must use HTTP or HTTPS, got '{}'",
            endpoint.scheme()
        )));
    }

    validate_index_name(&config.index)?;

    if config.document_type.is_empty() {
        return Err(ConfigError::Validation(
            "document-type cannot be empty".to_string(),
        ));
    }

    if config.password.is_some() && config.username.is_none() {
        return Err(ConfigError::Validation(
            "password is set but username is missing".to_string(),
        ));
    }

    Ok(())
}

/// Elasticsearch index names are lowercase and may not contain path or wildcard characters
fn validate_index_name(index: &str) -> Result<(), ConfigError> {
    if index.is_empty() {
        return Err(ConfigError::Validation("index cannot be empty".to_string()));
    }

    if index.starts_with(['-', '_', '+']) {
        return Err(ConfigError::Validation(format!(
            "index '{}' cannot start with '-', '_' or '+'",
            index
        )));
    }

    if index
        .chars()
        .any(|c| c.is_uppercase() || c.is_whitespace() || "\\/*?\"<>|,#:".contains(c))
    {
        return Err(ConfigError::Validation(format!(
            "index '{}' must be lowercase without special characters",
            index
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 32 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 32, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.fetch_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch-timeout must be >= 1s, got {}s",
            config.fetch_timeout
        )));
    }

    if config.run_deadline < config.fetch_timeout {
        return Err(ConfigError::Validation(format!(
            "run-deadline ({}s) must not be shorter than fetch-timeout ({}s)",
            config.run_deadline, config.fetch_timeout
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the layout selectors by compiling them
fn validate_selectors_config(config: &SelectorsConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("sitemap-container", &config.sitemap_container),
        ("project-title", &config.project_title),
    ] {
        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e))
        })?;
    }

    for page in &config.excluded_pages {
        if page.is_empty() || page.contains('/') {
            return Err(ConfigError::Validation(format!(
                "excluded-pages entries must be bare file names, got '{}'",
                page
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid contact-email: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid contact-email: '{}'",
            email
        )));
    }

    Ok(())
}

use crate::catalog::Language;
use crate::config::types::{Config, CrawlerConfig, HttpConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for the worker pool
const MAX_WORKERS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    resolve_languages(&config.languages)?;
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_http_config(&config.http)?;
    parse_search_url(&config.catalog.search_url)?;

    if config.output.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Maps language names to the store vocabulary
///
/// Fails if the list is empty, a name is unknown, or two names refer to the
/// same language.
pub fn resolve_languages(names: &[String]) -> Result<Vec<Language>, ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::Validation(
            "at least one language is required".to_string(),
        ));
    }

    let mut languages: Vec<Language> = Vec::with_capacity(names.len());
    for name in names {
        let language = Language::parse(name)?;
        if languages.contains(&language) {
            return Err(ConfigError::Validation(format!(
                "language '{}' was given more than once",
                language
            )));
        }
        languages.push(language);
    }

    Ok(languages)
}

/// Parses the search listing URL, which must be http(s)
pub fn parse_search_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search-url '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "search-url '{}' must use http or https",
            raw
        )));
    }

    Ok(url)
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_games < 1 {
        return Err(ConfigError::Validation(format!(
            "max-games must be at least 1, got {}",
            config.max_games
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be at least 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry max-attempts must be at least 1, got {}",
            config.max_attempts
        )));
    }

    if config.factor < 1 {
        return Err(ConfigError::Validation(format!(
            "retry factor must be at least 1, got {}",
            config.factor
        )));
    }

    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "retry max-delay-ms ({}) is below base-delay-ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "http timeouts must be at least 1 second".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

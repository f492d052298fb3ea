use crate::config::types::{
    ApiConfig, CatalogEntry, Config, CrawlerConfig, LinkerConfig, OutputConfig, RetryConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_retry_config(&config.retry)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_linker_config(&config.linker)?;
    validate_catalog(&config.catalog)?;
    Ok(())
}

fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    let account = config
        .ad_account_id
        .strip_prefix("act_")
        .unwrap_or(&config.ad_account_id);
    if account.is_empty() || !account.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::Validation(format!(
            "ad-account-id must be numeric (optionally prefixed with act_), got '{}'",
            config.ad_account_id
        )));
    }

    if config.page_limit < 1 || config.page_limit > 500 {
        return Err(ConfigError::Validation(format!(
            "page-limit must be between 1 and 500, got {}",
            config.page_limit
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.access_token.is_none() && config.access_token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "access-token-env cannot be empty when no access-token is given".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max-delay-ms ({}) must not be lower than base-delay-ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    if config.rate_limit_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "rate-limit-marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.live_status.trim().is_empty() {
        return Err(ConfigError::Validation(
            "live-status cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("results-path", &config.results_path),
        ("cursor-path", &config.cursor_path),
        ("linked-path", &config.linked_path),
        ("insights-path", &config.insights_path),
    ];

    let mut seen = HashSet::new();
    for (name, path) in paths {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
        if !seen.insert(path.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{} '{}' collides with another output path",
                name, path
            )));
        }
    }

    Ok(())
}

fn validate_linker_config(config: &LinkerConfig) -> Result<(), ConfigError> {
    if config.marketplace_domains.iter().any(|d| d.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "marketplace-domains cannot contain empty entries".to_string(),
        ));
    }

    if config.lead_gen_markers.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "lead-gen-markers cannot contain empty entries".to_string(),
        ));
    }

    if !config.lookup_url.is_empty() {
        Url::parse(&config.lookup_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid lookup-url: {}", e)))?;
    }

    if config.skip_keyword.trim().is_empty() {
        return Err(ConfigError::Validation(
            "skip-keyword cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(entries: &[CatalogEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if !is_product_id(&entry.asin) {
            return Err(ConfigError::Validation(format!(
                "catalog asin '{}' must be 10 alphanumeric characters",
                entry.asin
            )));
        }
        if entry.title.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "catalog entry {} has an empty title",
                entry.asin
            )));
        }
    }
    Ok(())
}

fn is_product_id(id: &str) -> bool {
    id.len() == 10 && id.chars().all(|c| c.is_ascii_alphanumeric())
}

//! Ad-Harvest: a resumable advertising catalog harvester
//!
//! This crate walks a campaign → ad set → ad hierarchy from a paginated,
//! rate-limited Graph-style API, resolves each ad's creative to a canonical
//! destination URL, checkpoints after every campaign, and links the
//! harvested ads to book metadata in a separate pass.

pub mod config;
pub mod crawler;
pub mod linker;
pub mod model;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Ad-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {path}: {source}")]
    Http {
        path: String,
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Rate limits or transport errors persisted through every attempt.
    /// This is fatal: the run stops instead of continuing blind.
    #[error("Retries exhausted for {path} ({attempts} attempts), aborting")]
    RetryExhausted { path: String, attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Metadata lookup error: {0}")]
    Lookup(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("No access token configured (set {0} or api.access-token)")]
    MissingToken(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Ad-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Category, LinkedEntry, ResumeCursor, UrlSource};
pub use crate::url::{extract_asin, normalize_url};

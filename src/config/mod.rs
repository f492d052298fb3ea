//! Configuration module for Ad-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The resulting [`Config`] is built once at startup and passed explicitly to
//! every component.
//!
//! # Example
//!
//! ```no_run
//! use ad_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Keeping entities with status {}", config.crawler.live_status);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    ApiConfig, CatalogEntry, Config, CrawlerConfig, FreebieConfig, LinkerConfig, OutputConfig,
    RetryConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

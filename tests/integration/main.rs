//! Integration tests for Ad-Harvest
//!
//! These tests use wiremock to stand in for the ads API and the
//! bibliographic lookup service.

mod crawl_tests;
mod link_tests;

use ad_harvest::config::{
    ApiConfig, Config, CrawlerConfig, LinkerConfig, OutputConfig, RetryConfig,
};
use std::path::Path;

pub const TOKEN: &str = "test-token";
pub const RATE_LIMIT_MARKER: &str = "User request limit reached";

/// Creates a test configuration pointing at `base_url` with outputs under `dir`
pub fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let out = |name: &str| dir.join(name).display().to_string();

    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            ad_account_id: "123".to_string(),
            access_token: Some(TOKEN.to_string()),
            access_token_env: "FB_ACCESS_TOKEN".to_string(),
            page_limit: 2,
            timeout_secs: 5,
        },
        retry: RetryConfig {
            base_delay_ms: 1,
            max_delay_ms: 5,
            max_attempts: 3,
            rate_limit_marker: RATE_LIMIT_MARKER.to_string(),
        },
        crawler: CrawlerConfig {
            live_status: "ACTIVE".to_string(),
            adset_delay_ms: 0, // No throttling unless a test asks for it
            resolve_creatives: true,
        },
        output: OutputConfig {
            results_path: out("ads.json"),
            cursor_path: out("fetch_progress.json"),
            linked_path: out("linked_ads.json"),
            insights_path: out("ad_insights.json"),
        },
        linker: LinkerConfig {
            lookup_url: String::new(),
            ..Default::default()
        },
        catalog: vec![],
    }
}

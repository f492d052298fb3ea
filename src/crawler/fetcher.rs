//! Transport client for the Graph-style ads API
//!
//! This module handles all remote requests for the harvester, including:
//! - Building the HTTP client
//! - Injecting the access token into every request
//! - Classifying responses (success, rate limited, other failure)
//! - Exponential backoff on rate limits, fatal once attempts run out
//! - Following cursor pagination on listing endpoints

use crate::config::{ApiConfig, RetryConfig};
use crate::crawler::backoff::RetryPolicy;
use crate::model::Page;
use crate::{ConfigError, HarvestError};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

/// Response headers carrying quota telemetry
const USAGE_HEADERS: &[&str] = &[
    "x-app-usage",
    "x-ad-account-usage",
    "x-business-use-case-usage",
];

/// Classification of a single HTTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// HTTP 200
    Success,

    /// Non-200 whose body carries the rate-limit marker
    RateLimited,

    /// Any other non-200; treated as an empty result
    Failed,
}

/// Classifies a response by status and body
///
/// | Condition | Class |
/// |-----------|-------|
/// | HTTP 200 | Success |
/// | non-200, body contains marker | RateLimited |
/// | any other non-200 | Failed |
pub fn classify_response(status: StatusCode, body: &str, marker: &str) -> ResponseClass {
    if status == StatusCode::OK {
        ResponseClass::Success
    } else if body.contains(marker) {
        ResponseClass::RateLimited
    } else {
        ResponseClass::Failed
    }
}

/// Builds the underlying HTTP client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Authenticated client for the ads API
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    access_token: String,
    page_limit: u32,
    policy: RetryPolicy,
    rate_limit_marker: String,
}

impl GraphClient {
    /// Creates a client from configuration
    ///
    /// Fails with `ConfigError::MissingToken` if no token was resolved.
    pub fn new(api: &ApiConfig, retry: &RetryConfig) -> Result<Self, HarvestError> {
        let access_token = api
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingToken(api.access_token_env.clone()))?;

        Ok(Self {
            client: build_http_client(api)?,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            access_token,
            page_limit: api.page_limit,
            policy: RetryPolicy::from_config(retry),
            rate_limit_marker: retry.rate_limit_marker.clone(),
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issues a GET and returns the parsed JSON body
    ///
    /// Non-rate-limit failures are logged and come back as an empty JSON
    /// object; callers treat that like an empty page. Rate limits and
    /// transport errors are retried with backoff. Running out of attempts
    /// returns `HarvestError::RetryExhausted`.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HarvestError> {
        let url = self.endpoint(path);
        let attempts = self.policy.max_attempts();

        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;

            let response = match self
                .client
                .get(&url)
                .query(params)
                .query(&[("access_token", self.access_token.as_str())])
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    tracing::warn!("Transport error for {}: {}", path, e);
                    if !is_last {
                        self.wait(attempt, "Transport error").await;
                    }
                    continue;
                }
                Err(source) => {
                    return Err(HarvestError::Http {
                        path: path.to_string(),
                        source,
                    })
                }
            };

            let status = response.status();
            log_usage(path, response.headers());

            if status == StatusCode::OK {
                return match response.json::<Value>().await {
                    Ok(body) => Ok(body),
                    Err(e) => {
                        tracing::warn!("Unreadable JSON from {}: {}", path, e);
                        Ok(empty_result())
                    }
                };
            }

            let body = response.text().await.unwrap_or_default();
            match classify_response(status, &body, &self.rate_limit_marker) {
                ResponseClass::RateLimited => {
                    if !is_last {
                        self.wait(attempt, "Rate limit hit").await;
                    }
                }
                _ => {
                    tracing::warn!("API error for {}: {} {}", path, status.as_u16(), body);
                    return Ok(empty_result());
                }
            }
        }

        Err(HarvestError::RetryExhausted {
            path: path.to_string(),
            attempts,
        })
    }

    async fn wait(&self, attempt: u32, reason: &str) {
        let delay = self.policy.delay(attempt);
        tracing::warn!(
            "{} (attempt {}/{}), backing off for {:?}",
            reason,
            attempt + 1,
            self.policy.max_attempts(),
            delay
        );
        tokio::time::sleep(delay).await;
    }

    /// Fetches a single object; `None` when the API returned no data
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &str,
    ) -> Result<Option<T>, HarvestError> {
        let body = self.get(path, &[("fields", fields.to_string())]).await?;
        if is_empty_result(&body) {
            return Ok(None);
        }

        match serde_json::from_value(body) {
            Ok(object) => Ok(Some(object)),
            Err(e) => {
                tracing::warn!("Unexpected object shape from {}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Fetches every page of a listing endpoint
    ///
    /// Pages are requested with `after=<cursor>` until the response stops
    /// advertising a next page. Items are decoded one by one; an item that
    /// does not decode is logged and skipped without losing its siblings.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, HarvestError> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut page_params: Vec<(&str, String)> = params.to_vec();
            page_params.push(("limit", self.page_limit.to_string()));
            if let Some(cursor) = &after {
                page_params.push(("after", cursor.clone()));
            }

            let body = self.get(path, &page_params).await?;
            let page: Page<Value> = match serde_json::from_value(body) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Unexpected listing shape from {}: {}", path, e);
                    break;
                }
            };

            let next = page.next_cursor().map(str::to_string);
            for item in page.data {
                match serde_json::from_value::<T>(item) {
                    Ok(decoded) => items.push(decoded),
                    Err(e) => tracing::warn!("Skipping undecodable item from {}: {}", path, e),
                }
            }

            match next {
                Some(cursor) if after.as_deref() != Some(cursor.as_str()) => {
                    tracing::debug!("Following {} to next page", path);
                    after = Some(cursor);
                }
                _ => break,
            }
        }

        Ok(items)
    }
}

/// Empty-result sentinel returned for non-retryable failures
pub fn empty_result() -> Value {
    Value::Object(Map::new())
}

fn is_empty_result(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}

fn log_usage(path: &str, headers: &HeaderMap) {
    for name in USAGE_HEADERS {
        if let Some(value) = headers.get(*name).and_then(|v| v.to_str().ok()) {
            tracing::debug!("Quota usage after {} ({}): {}", path, name, value);
        }
    }
}

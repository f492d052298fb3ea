//! Rate-limit retry policy
//!
//! Delays double from a base value up to a ceiling. The policy is a plain
//! value so the schedule can be inspected without issuing requests.

use crate::config::RetryConfig;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    base_ms: u64,
    max_ms: u64,
    max_attempts: u32,
}

impl RetryPolicy {
    pub const fn new(base_ms: u64, max_ms: u64, max_attempts: u32) -> Self {
        Self {
            base_ms,
            max_ms,
            max_attempts,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.base_delay_ms,
            config.max_delay_ms,
            config.max_attempts,
        )
    }

    /// Total attempts allowed for a single request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the retry that follows failed attempt `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_ms
            .saturating_mul(2u64.saturating_pow(attempt.min(32)));
        Duration::from_millis(exponential.min(self.max_ms))
    }

    /// Full wait schedule; the final attempt is never followed by a wait
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(move |attempt| self.delay(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

//! Retry mechanism with exponential backoff

use super::types::RetryConfig;
use crate::utils::error::ErrorKind;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Retry eligibility and backoff computation
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Whether a failure of `kind` on attempt `attempt` (0-based) earns another attempt
    pub fn should_retry(&self, kind: ErrorKind, attempt: u32) -> bool {
        if attempt >= self.config.max_retries {
            return false;
        }
        kind.is_retryable()
    }

    /// `min(max_delay, initial_delay * multiplier^attempt)`
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        let initial = self.config.initial_delay.as_millis() as f64;
        let max = self.config.max_delay.as_millis() as f64;
        let exponent = attempt.min(i32::MAX as u32) as i32;

        let delay = initial * self.config.multiplier.powi(exponent);
        // powi overflows to inf for large attempts
        let millis = if delay.is_finite() { delay.min(max) } else { max };
        Duration::from_millis(millis.round() as u64)
    }

    /// [`compute_delay`](Self::compute_delay) with uniform noise of up to ±25%
    pub fn compute_delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.compute_delay(attempt).as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }

        // Integer bounds, rounded inwards so the result stays inside [0.75b, 1.25b].
        let lo = (base * 3).div_ceil(4);
        let hi = base * 5 / 4;
        let millis = rand::thread_rng().gen_range(lo..=hi);
        Duration::from_millis(millis)
    }

    /// The delay the orchestrator sleeps before the next attempt
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = if self.config.jitter {
            self.compute_delay_with_jitter(attempt)
        } else {
            self.compute_delay(attempt)
        };
        debug!("Backoff after attempt {}: {:?}", attempt, delay);
        delay
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

//! Section validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for BatchConfig {
    fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("Pool size must be greater than 0".to_string());
        }
        if self.pool_size > 1024 {
            return Err("Pool size seems too high (>1024)".to_string());
        }
        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.permits_per_second == 0 {
            return Err("Rate limit must allow at least 1 permit per second".to_string());
        }
        Ok(())
    }
}

impl Validate for BreakerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating circuit breaker configuration");

        if self.failure_threshold == 0 {
            return Err("Circuit breaker failure threshold must be greater than 0".to_string());
        }
        if self.half_open_successes == 0 {
            return Err("Circuit breaker half-open successes must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for BackoffConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating retry configuration");

        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(format!(
                "Retry multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(format!(
                "Retry initial delay ({} ms) exceeds max delay ({} ms)",
                self.initial_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }
}

impl Validate for CheckpointConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.directory.as_os_str().is_empty() {
            return Err("Checkpoint directory cannot be empty when checkpoints are enabled".to_string());
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for HandlerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.command.first().is_some_and(|program| program.trim().is_empty()) {
            return Err("Handler program cannot be empty".to_string());
        }
        Ok(())
    }
}

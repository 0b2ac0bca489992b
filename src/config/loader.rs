//! Configuration loading utilities
//!
//! This module applies `BATCH_*` environment variables on top of a configuration.

use super::Config;
use crate::utils::error::{BatchError, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

impl Config {
    /// Override fields from `BATCH_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Load a YAML file with `BATCH_*` environment overrides applied before validation
    pub async fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_overrides(path, |key| env::var(key).ok()).await
    }

    /// Override fields from any key/value source, e.g. a map in tests
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let mut set = |key: &str| {
            let value = lookup(key);
            if value.is_some() {
                applied += 1;
            }
            value
        };

        // Worker pool
        if let Some(v) = set("BATCH_POOL_SIZE") {
            self.batch.pool_size = parse("BATCH_POOL_SIZE", &v)?;
        }
        if let Some(v) = set("BATCH_SHUTDOWN_TIMEOUT_MS") {
            self.batch.shutdown_timeout_ms = parse("BATCH_SHUTDOWN_TIMEOUT_MS", &v)?;
        }

        // Rate limiting
        if let Some(v) = set("BATCH_RATE_LIMIT") {
            self.rate_limit.permits_per_second = parse("BATCH_RATE_LIMIT", &v)?;
        }

        // Circuit breaker
        if let Some(v) = set("BATCH_CB_FAILURE_THRESHOLD") {
            self.circuit_breaker.failure_threshold = parse("BATCH_CB_FAILURE_THRESHOLD", &v)?;
        }
        if let Some(v) = set("BATCH_CB_RESET_TIMEOUT_MS") {
            self.circuit_breaker.reset_timeout_ms = parse("BATCH_CB_RESET_TIMEOUT_MS", &v)?;
        }

        // Retry
        if let Some(v) = set("BATCH_RETRY_MAX") {
            self.retry.max_retries = parse("BATCH_RETRY_MAX", &v)?;
        }
        if let Some(v) = set("BATCH_RETRY_INITIAL_DELAY_MS") {
            self.retry.initial_delay_ms = parse("BATCH_RETRY_INITIAL_DELAY_MS", &v)?;
        }
        if let Some(v) = set("BATCH_RETRY_MULTIPLIER") {
            self.retry.multiplier = parse("BATCH_RETRY_MULTIPLIER", &v)?;
        }
        if let Some(v) = set("BATCH_RETRY_MAX_DELAY_MS") {
            self.retry.max_delay_ms = parse("BATCH_RETRY_MAX_DELAY_MS", &v)?;
        }

        // Checkpoints
        if let Some(v) = set("BATCH_CHECKPOINT_DIR") {
            self.checkpoint.directory = PathBuf::from(v);
        }
        if let Some(v) = set("BATCH_CHECKPOINT_ENABLED") {
            self.checkpoint.enabled = parse_bool("BATCH_CHECKPOINT_ENABLED", &v)?;
        }

        // Logging
        if let Some(v) = set("BATCH_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = set("BATCH_LOG_JSON") {
            self.logging.json = parse_bool("BATCH_LOG_JSON", &v)?;
        }

        debug!("Applied {} environment overrides", applied);
        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BatchError::Config(format!("Invalid {}={:?}: {}", key, value, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BatchError::Config(format!(
            "Invalid {}={:?}: expected a boolean",
            key, value
        ))),
    }
}

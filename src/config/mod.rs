//! Configuration management for the batch runner
//!
//! This module handles loading, validation, and management of all runner configuration.

mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{BatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the batch runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub circuit_breaker: BreakerConfig,
    #[serde(default)]
    pub retry: BackoffConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub handler: HandlerConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read_file(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file, apply overrides from `lookup`, then validate the result
    pub async fn from_file_with_overrides<P, F>(path: P, lookup: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::read_file(path.as_ref()).await?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config = Self::parse_yaml(content)?;
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BatchError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::parse_yaml(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    fn parse_yaml(content: &str) -> Result<Self> {
        // An empty document means all defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| BatchError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.batch
            .validate()
            .map_err(|e| BatchError::Config(format!("Batch config error: {}", e)))?;
        self.rate_limit
            .validate()
            .map_err(|e| BatchError::Config(format!("Rate limit config error: {}", e)))?;
        self.circuit_breaker
            .validate()
            .map_err(|e| BatchError::Config(format!("Circuit breaker config error: {}", e)))?;
        self.retry
            .validate()
            .map_err(|e| BatchError::Config(format!("Retry config error: {}", e)))?;
        self.checkpoint
            .validate()
            .map_err(|e| BatchError::Config(format!("Checkpoint config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| BatchError::Config(format!("Logging config error: {}", e)))?;
        self.handler
            .validate()
            .map_err(|e| BatchError::Config(format!("Handler config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| BatchError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

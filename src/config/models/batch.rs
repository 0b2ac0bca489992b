//! Worker pool configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of items processed at once
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// How long in-flight items may run after cancellation
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl BatchConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

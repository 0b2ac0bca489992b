//! Rate limiting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Calls allowed per one-second window, shared by all workers
    #[serde(default = "default_permits_per_second")]
    pub permits_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            permits_per_second: default_permits_per_second(),
        }
    }
}

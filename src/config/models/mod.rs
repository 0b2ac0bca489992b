//! Configuration data models
//!
//! This module defines all configuration structures used by the batch runner.

#![allow(missing_docs)]

pub mod batch;
pub mod checkpoint;
pub mod handler;
pub mod logging;
pub mod rate_limit;
pub mod resilience;

// Re-export all configuration types
pub use batch::*;
pub use checkpoint::*;
pub use handler::*;
pub use logging::*;
pub use rate_limit::*;
pub use resilience::*;

/// Default worker pool size
pub fn default_pool_size() -> usize {
    4
}

/// Default grace period for in-flight items after cancellation, in milliseconds
pub fn default_shutdown_timeout_ms() -> u64 {
    30_000
}

pub fn default_permits_per_second() -> u32 {
    10
}

pub fn default_failure_threshold() -> u32 {
    5
}

pub fn default_reset_timeout_ms() -> u64 {
    30_000
}

pub fn default_half_open_successes() -> u32 {
    3
}

/// Default maximum retry attempts
pub fn default_max_retries() -> u32 {
    3
}

pub fn default_initial_delay_ms() -> u64 {
    1_000
}

pub fn default_multiplier() -> f64 {
    2.0
}

pub fn default_max_delay_ms() -> u64 {
    32_000
}

pub fn default_checkpoint_dir() -> std::path::PathBuf {
    std::path::PathBuf::from(".checkpoints")
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

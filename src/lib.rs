//! # batch-review
//!
//! Resilient, resumable batch execution of work items against a rate-limited
//! remote analysis service.
//!
//! ## Features
//!
//! - **Bounded parallelism**: a per-batch worker pool of `pool_size` tasks
//! - **Rate limiting**: one token bucket shared by every worker
//! - **Circuit breaking**: stop calling a failing service, probe it after a cool-down
//! - **Retries**: exponential backoff with jitter, eligibility decided by error kind
//! - **Checkpoints**: completed items are recorded and skipped on the next run
//! - **Metrics**: lock-free counters and latency statistics, with a text report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batch_review::{BatchOrchestrator, ItemFailure, WorkItem, handler_fn};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = BatchOrchestrator::new(4);
//!
//!     let items = vec![
//!         WorkItem::new("src/main.rs#1", json!({ "code": "fn main() {}" })),
//!         WorkItem::new("src/lib.rs#1", json!({ "code": "pub mod core;" })),
//!     ];
//!
//!     let handler = handler_fn(|item: WorkItem| async move {
//!         if item.payload.is_null() {
//!             return Err(ItemFailure::validation("empty chunk"));
//!         }
//!         Ok(json!({ "score": 8.0 }))
//!     });
//!
//!     let result = orchestrator.run_batch(items, handler).await?;
//!     println!("{}", result.render_summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Resuming From Checkpoints
//!
//! ```rust,no_run
//! use batch_review::{BatchOrchestrator, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/batch.yaml").await?;
//!     // Items recorded under `checkpoint.directory` are skipped.
//!     let orchestrator = BatchOrchestrator::from_config(&config)?;
//!     # let _ = orchestrator;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod monitoring;
pub mod services;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{
    BatchError, CircuitBreaker, CircuitBreakerConfig, CircuitState, ErrorKind, ItemFailure,
    Result, RetryConfig, RetryPolicy,
};

pub use core::checkpoint::{
    CheckpointBackend, CheckpointRecord, CheckpointStore, FileCheckpointBackend,
};
pub use core::item::{ItemStatus, WorkItem};
pub use core::orchestrator::{
    BatchOrchestrator, BatchResult, FnHandler, ItemHandler, ItemOutcome, handler_fn,
};
pub use core::rate_limiter::RateLimiter;
pub use monitoring::{MetricsSnapshot, PerformanceMetrics};
pub use services::CommandHandler;

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information stamped by `build.rs`
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build time, seconds since the epoch
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}, built {}, {})",
            NAME, self.version, self.git_hash, self.build_time, self.rust_version
        )
    }
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}

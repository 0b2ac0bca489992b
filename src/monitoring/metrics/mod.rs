//! Metrics collection and aggregation
//!
//! Counters for handler invocations, latencies and error kinds, updated
//! concurrently by all workers without locks.

mod collector;
mod helpers;
mod types;


pub use collector::PerformanceMetrics;
pub use types::MetricsSnapshot;

//! Monitoring and observability
//!
//! This module provides the lock-free performance metrics shared by all workers.

pub mod metrics;

pub use metrics::{MetricsSnapshot, PerformanceMetrics};

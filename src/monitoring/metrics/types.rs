//! Types for metrics snapshots

use super::helpers::{average, percentage};
use crate::utils::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Read-only copy of [`PerformanceMetrics`](super::PerformanceMetrics) counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Handler invocations
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub retried_requests: u64,
    /// Attempts rejected by an open circuit
    pub circuit_open_count: u64,
    /// Failed invocations per error kind
    pub errors_by_kind: BTreeMap<ErrorKind, u64>,
    pub sum_latency_ms: u64,
    /// 0 when nothing succeeded
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl MetricsSnapshot {
    /// Successful invocations as a percentage of all invocations
    pub fn success_rate(&self) -> f64 {
        percentage(self.successful_requests, self.total_requests)
    }

    /// Mean latency of successful invocations
    pub fn average_latency_ms(&self) -> f64 {
        average(self.sum_latency_ms, self.successful_requests)
    }

    /// Failure count for one kind
    pub fn errors(&self, kind: ErrorKind) -> u64 {
        self.errors_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Performance Metrics ===")?;
        writeln!(f, "Total requests:      {}", self.total_requests)?;
        writeln!(f, "Successful requests: {}", self.successful_requests)?;
        writeln!(f, "Failed requests:     {}", self.failed_requests)?;
        writeln!(f, "Retries:             {}", self.retried_requests)?;
        writeln!(f, "Success rate:        {:.2}%", self.success_rate())?;
        writeln!(f)?;
        writeln!(f, "Latency:")?;
        writeln!(f, "  avg: {:.2} ms", self.average_latency_ms())?;
        writeln!(f, "  min: {} ms", self.min_latency_ms)?;
        writeln!(f, "  max: {} ms", self.max_latency_ms)?;
        writeln!(f)?;
        writeln!(f, "Errors by kind:")?;
        for kind in ErrorKind::ALL {
            writeln!(f, "  {:<16} {}", kind.as_str(), self.errors(kind))?;
        }
        writeln!(f)?;
        write!(f, "Circuit breaker rejections: {}", self.circuit_open_count)
    }
}

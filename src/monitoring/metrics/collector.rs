//! Metrics collector implementation for recording metrics

use super::types::MetricsSnapshot;
use crate::utils::error::ErrorKind;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free request metrics shared by every worker of a batch
#[derive(Debug)]
pub struct PerformanceMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    retried_requests: AtomicU64,
    circuit_open_count: AtomicU64,
    /// One slot per [`ErrorKind`], indexed by `ErrorKind::index`
    errors_by_kind: [AtomicU64; ErrorKind::ALL.len()],
    sum_latency_ms: AtomicU64,
    /// `u64::MAX` until the first success
    min_latency_ms: AtomicU64,
    max_latency_ms: AtomicU64,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            retried_requests: AtomicU64::new(0),
            circuit_open_count: AtomicU64::new(0),
            errors_by_kind: Default::default(),
            sum_latency_ms: AtomicU64::new(0),
            min_latency_ms: AtomicU64::new(u64::MAX),
            max_latency_ms: AtomicU64::new(0),
        }
    }

    /// Record an invocation of the item handler
    #[inline]
    pub fn record_request_start(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful invocation and its latency
    pub fn record_success(&self, latency_ms: u64) {
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.sum_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.min_latency_ms.fetch_min(latency_ms, Ordering::Relaxed);
        self.max_latency_ms.fetch_max(latency_ms, Ordering::Relaxed);
    }

    /// Record a failed invocation
    pub fn record_failure(&self, kind: ErrorKind) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        self.errors_by_kind[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_retry(&self) {
        self.retried_requests.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_circuit_open(&self) {
        self.circuit_open_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time read of all counters. Not linearizable across fields.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let min = self.min_latency_ms.load(Ordering::Relaxed);
        let errors_by_kind: BTreeMap<ErrorKind, u64> = ErrorKind::ALL
            .iter()
            .map(|kind| {
                (
                    *kind,
                    self.errors_by_kind[kind.index()].load(Ordering::Relaxed),
                )
            })
            .collect();

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            retried_requests: self.retried_requests.load(Ordering::Relaxed),
            circuit_open_count: self.circuit_open_count.load(Ordering::Relaxed),
            errors_by_kind,
            sum_latency_ms: self.sum_latency_ms.load(Ordering::Relaxed),
            min_latency_ms: if min == u64::MAX { 0 } else { min },
            max_latency_ms: self.max_latency_ms.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.total_requests,
            &self.successful_requests,
            &self.failed_requests,
            &self.retried_requests,
            &self.circuit_open_count,
            &self.sum_latency_ms,
            &self.max_latency_ms,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        for counter in &self.errors_by_kind {
            counter.store(0, Ordering::Relaxed);
        }
        self.min_latency_ms.store(u64::MAX, Ordering::Relaxed);
    }
}

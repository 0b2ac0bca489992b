//! Per-item execution: rate limiting, circuit breaking, retries, checkpointing

use super::handler::ItemHandler;
use super::result::ItemOutcome;
use crate::core::checkpoint::CheckpointStore;
use crate::core::item::WorkItem;
use crate::core::rate_limiter::RateLimiter;
use crate::monitoring::metrics::PerformanceMetrics;
use crate::utils::error::{CircuitBreaker, ItemFailure, RetryPolicy};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Shared components one worker task needs, cheap to clone
#[derive(Clone)]
pub(super) struct Worker {
    pub(super) rate_limiter: Arc<RateLimiter>,
    pub(super) circuit_breaker: Arc<CircuitBreaker>,
    pub(super) retry_policy: Arc<RetryPolicy>,
    pub(super) metrics: Arc<PerformanceMetrics>,
    pub(super) checkpoints: Arc<CheckpointStore>,
    pub(super) handler: Arc<dyn ItemHandler>,
    pub(super) cancel: CancellationToken,
}

impl Worker {
    /// Drive one item to a terminal state. Never panics outward on handler panics.
    pub(super) async fn process(&self, item: WorkItem) -> ItemOutcome {
        let max_retries = self.retry_policy.max_retries();
        let mut attempts = 0;
        let mut last_failure: Option<ItemFailure> = None;

        for attempt in 0..=max_retries {
            if self.cancel.is_cancelled() {
                return ItemOutcome::cancelled(item.id, attempts, last_failure);
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return ItemOutcome::cancelled(item.id, attempts, last_failure);
                }
                _ = self.rate_limiter.acquire() => {}
            }
            attempts += 1;

            if !self.circuit_breaker.allow_request() {
                self.metrics.record_circuit_open();
                debug!(
                    "Circuit open, attempt {} of {} rejected for {}",
                    attempt + 1,
                    max_retries.saturating_add(1),
                    item.id
                );
                last_failure = Some(ItemFailure::service("circuit breaker open"));
                if attempt == max_retries {
                    break;
                }
                if !self.backoff(attempt).await {
                    return ItemOutcome::cancelled(item.id, attempts, last_failure);
                }
                continue;
            }

            self.metrics.record_request_start();
            let started = Instant::now();
            let result = AssertUnwindSafe(self.handler.handle(&item))
                .catch_unwind()
                .await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let failure = match result {
                Ok(Ok(payload)) => {
                    self.circuit_breaker.record_success();
                    self.metrics.record_success(latency_ms);
                    self.checkpoints
                        .save(&item.id, payload.clone(), chrono::Utc::now().timestamp_millis())
                        .await;
                    debug!(
                        "Item {} succeeded on attempt {} in {} ms",
                        item.id,
                        attempt + 1,
                        latency_ms
                    );
                    return ItemOutcome::succeeded(item.id, attempts, payload);
                }
                Ok(Err(failure)) => failure,
                Err(panic) => {
                    let message = panic_message(&*panic);
                    error!("Handler panicked on item {}: {}", item.id, message);
                    ItemFailure::unknown(format!("handler panicked: {}", message))
                }
            };

            self.circuit_breaker.record_failure();
            self.metrics.record_failure(failure.kind);
            debug!(
                "Item {} attempt {} failed: {}",
                item.id,
                attempt + 1,
                failure
            );

            let retry = self.retry_policy.should_retry(failure.kind, attempt);
            last_failure = Some(failure);
            if !retry {
                break;
            }
            if !self.backoff(attempt).await {
                return ItemOutcome::cancelled(item.id, attempts, last_failure);
            }
            self.metrics.record_retry();
        }

        let failure = last_failure
            .unwrap_or_else(|| ItemFailure::unknown("no attempt was made"));
        warn!(
            "Item {} failed after {} attempt(s): {}",
            item.id, attempts, failure
        );
        ItemOutcome::failed(item.id, attempts, failure)
    }

    /// Sleep before the next attempt. Returns false if cancelled meanwhile.
    async fn backoff(&self, attempt: u32) -> bool {
        let delay = self.retry_policy.backoff_delay(attempt);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

pub(super) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//! Batch orchestrator: bounded-parallel, resumable execution of work items

use super::handler::ItemHandler;
use super::result::{BatchResult, ItemOutcome};
use super::worker::{Worker, panic_message};
use crate::config::Config;
use crate::core::checkpoint::CheckpointStore;
use crate::core::item::WorkItem;
use crate::core::rate_limiter::RateLimiter;
use crate::monitoring::metrics::PerformanceMetrics;
use crate::utils::error::{
    BatchError, CircuitBreaker, CircuitBreakerConfig, ItemFailure, Result, RetryConfig,
    RetryPolicy,
};
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const DEFAULT_POOL_SIZE: usize = 4;
const DEFAULT_PERMITS_PER_SECOND: u32 = 10;
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

type Joined = std::result::Result<(usize, ItemOutcome), JoinError>;

/// Runs batches of work items through the rate limiter, circuit breaker,
/// retry policy and checkpoint store
///
/// All components are shared instances injected at construction; each
/// `run_batch` call owns its own worker pool, created on entry and drained
/// before it returns.
pub struct BatchOrchestrator {
    pool_size: usize,
    shutdown_timeout: Duration,
    rate_limiter: Arc<RateLimiter>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry_policy: Arc<RetryPolicy>,
    metrics: Arc<PerformanceMetrics>,
    checkpoints: Arc<CheckpointStore>,
    cancel: CancellationToken,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl BatchOrchestrator {
    /// Create an orchestrator with default components and a process-local checkpoint store
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size: pool_size.max(1),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            rate_limiter: Arc::new(RateLimiter::new(DEFAULT_PERMITS_PER_SECOND)),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            retry_policy: Arc::new(RetryPolicy::default()),
            metrics: Arc::new(PerformanceMetrics::new()),
            checkpoints: Arc::new(CheckpointStore::in_memory()),
            cancel: CancellationToken::new(),
        }
    }

    /// Wire every component from one configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(config.batch.pool_size)
            .with_shutdown_timeout(Duration::from_millis(config.batch.shutdown_timeout_ms))
            .with_rate_limiter(Arc::new(RateLimiter::new(
                config.rate_limit.permits_per_second,
            )))
            .with_circuit_breaker(Arc::new(CircuitBreaker::new(CircuitBreakerConfig::from(
                &config.circuit_breaker,
            ))))
            .with_retry_policy(Arc::new(RetryPolicy::new(RetryConfig::from(&config.retry))))
            .with_checkpoint_store(Arc::new(CheckpointStore::from_config(&config.checkpoint))))
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: Arc<RetryPolicy>) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PerformanceMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_checkpoint_store(mut self, checkpoints: Arc<CheckpointStore>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    /// How long in-flight items may keep running after cancellation before they are aborted
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Use an externally owned token, e.g. one tied to a signal handler
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.circuit_breaker
    }

    pub fn retry_policy(&self) -> &Arc<RetryPolicy> {
        &self.retry_policy
    }

    pub fn metrics(&self) -> &Arc<PerformanceMetrics> {
        &self.metrics
    }

    pub fn checkpoint_store(&self) -> &Arc<CheckpointStore> {
        &self.checkpoints
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop dispatching new items and interrupt retry sleeps
    pub fn cancel(&self) {
        info!("Batch cancellation requested");
        self.cancel.cancel();
    }

    /// Execute `items` with `handler` and report every item's terminal state.
    ///
    /// Items with a checkpoint are skipped without invoking the handler.
    /// Per-item failures, including handler panics, are recorded in the
    /// result. An item with an empty id, or an id already seen earlier in the
    /// batch, fails with `VALIDATION_ERROR` without reaching the handler. Only
    /// a cancelled orchestrator returns an error.
    pub async fn run_batch<H>(&self, items: Vec<WorkItem>, handler: H) -> Result<BatchResult>
    where
        H: ItemHandler + 'static,
    {
        if self.cancel.is_cancelled() {
            return Err(BatchError::cancelled(
                "orchestrator was cancelled before the batch started",
            ));
        }

        let run_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        info!(
            "Batch {} starting: {} items, pool size {}",
            run_id,
            items.len(),
            self.pool_size
        );

        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        let mut outcomes: Vec<Option<ItemOutcome>> = vec![None; items.len()];
        let mut pending = Vec::with_capacity(items.len());
        let mut seen = HashSet::with_capacity(items.len());
        let mut rejected = 0;
        for (index, item) in items.into_iter().enumerate() {
            if let Some(failure) = reject_id(&item.id, &mut seen) {
                warn!("Batch {}: rejecting item {}: {}", run_id, index, failure.message);
                rejected += 1;
                outcomes[index] = Some(ItemOutcome::failed(item.id, 0, failure));
            } else if self.checkpoints.exists(&item.id).await {
                debug!("Skipping {}: already completed", item.id);
                let record = self.checkpoints.load(&item.id).await;
                outcomes[index] = Some(ItemOutcome::skipped(item.id, record));
            } else {
                pending.push((index, item));
            }
        }
        let skipped = ids.len() - pending.len() - rejected;
        if skipped > 0 {
            info!("Batch {}: {} items already completed, skipping", run_id, skipped);
        }

        let worker = Worker {
            rate_limiter: self.rate_limiter.clone(),
            circuit_breaker: self.circuit_breaker.clone(),
            retry_policy: self.retry_policy.clone(),
            metrics: self.metrics.clone(),
            checkpoints: self.checkpoints.clone(),
            handler: Arc::new(handler),
            cancel: self.cancel.clone(),
        };

        let mut tasks = JoinSet::new();
        self.dispatch(pending, worker, &mut tasks, &mut outcomes).await?;
        self.drain(&mut tasks, &mut outcomes).await;

        let outcomes: Vec<ItemOutcome> = outcomes
            .into_iter()
            .zip(ids)
            .map(|(outcome, id)| outcome.unwrap_or_else(|| ItemOutcome::cancelled(id, 0, None)))
            .collect();

        let result = BatchResult::new(
            run_id,
            outcomes,
            started_at,
            clock.elapsed().as_millis() as u64,
            self.metrics.snapshot(),
            self.checkpoints.persist_failures(),
        );
        info!(
            "Batch {} finished in {} ms: {} succeeded, {} failed, {} skipped, {} cancelled",
            run_id, result.duration_ms, result.succeeded, result.failed, result.skipped, result.cancelled
        );
        Ok(result)
    }

    /// Spawn one task per pending item, at most `pool_size` running at once
    async fn dispatch(
        &self,
        pending: Vec<(usize, WorkItem)>,
        worker: Worker,
        tasks: &mut JoinSet<(usize, ItemOutcome)>,
        outcomes: &mut [Option<ItemOutcome>],
    ) -> Result<()> {
        let permits = Arc::new(Semaphore::new(self.pool_size));
        let mut pending = pending.into_iter();

        while let Some((index, item)) = pending.next() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    let remaining = 1 + pending.len();
                    info!("Dispatch stopped, {} items not started", remaining);
                    outcomes[index] = Some(ItemOutcome::cancelled(item.id, 0, None));
                    for (index, item) in pending.by_ref() {
                        outcomes[index] = Some(ItemOutcome::cancelled(item.id, 0, None));
                    }
                    break;
                }
                permit = permits.clone().acquire_owned() => permit
                    .map_err(|e| BatchError::internal(format!("worker pool closed: {}", e)))?,
            };

            let worker = worker.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let item_id = item.id.clone();
                let outcome = match AssertUnwindSafe(worker.process(item)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => {
                        let message = panic_message(&*panic);
                        error!("Worker for {} panicked: {}", item_id, message);
                        ItemOutcome::failed(
                            item_id,
                            0,
                            ItemFailure::unknown(format!("worker panicked: {}", message)),
                        )
                    }
                };
                (index, outcome)
            });
        }
        Ok(())
    }

    /// Wait for every task. After cancellation, wait at most `shutdown_timeout`, then abort.
    async fn drain(
        &self,
        tasks: &mut JoinSet<(usize, ItemOutcome)>,
        outcomes: &mut [Option<ItemOutcome>],
    ) {
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(joined) => record_joined(joined, outcomes),
                    None => return,
                },
                _ = self.cancel.cancelled() => break,
            }
        }

        info!(
            "Waiting up to {:?} for {} in-flight items",
            self.shutdown_timeout,
            tasks.len()
        );
        let deadline = tokio::time::sleep(self.shutdown_timeout);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(joined) => record_joined(joined, outcomes),
                    None => return,
                },
                _ = &mut deadline => break,
            }
        }

        warn!(
            "Shutdown timeout elapsed, aborting {} in-flight items",
            tasks.len()
        );
        tasks.abort_all();
        while let Some(joined) = tasks.join_next().await {
            record_joined(joined, outcomes);
        }
    }
}

fn record_joined(joined: Joined, outcomes: &mut [Option<ItemOutcome>]) {
    match joined {
        Ok((index, outcome)) => outcomes[index] = Some(outcome),
        // Aborted tasks leave their slot empty and are reported as cancelled.
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!("Worker task failed: {}", e),
    }
}

/// Validation failure for an empty id or a repeat of an id seen earlier
fn reject_id(id: &str, seen: &mut HashSet<String>) -> Option<ItemFailure> {
    if id.is_empty() {
        return Some(ItemFailure::validation("work item id must not be empty"));
    }
    if !seen.insert(id.to_string()) {
        return Some(ItemFailure::validation(format!(
            "duplicate work item id: {}",
            id
        )));
    }
    None
}

//! Circuit breaker implementation for fault tolerance
//!
//! State lives in atomics so every worker can consult and update the breaker
//! without holding a lock across an item invocation. Transitions are applied
//! with compare-and-swap, which keeps them to the legal set:
//! `CLOSED → OPEN`, `OPEN → HALF_OPEN`, `HALF_OPEN → CLOSED`, `HALF_OPEN → OPEN`.

use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Circuit breaker shared by all workers of a batch
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    half_open_successes: AtomicU32,
    /// Milliseconds since `origin` at the most recent failure
    last_failure_ms: AtomicU64,
    origin: Instant,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: AtomicU8::new(CircuitState::Closed as u8),
            consecutive_failures: AtomicU32::new(0),
            half_open_successes: AtomicU32::new(0),
            last_failure_ms: AtomicU64::new(0),
            origin: Instant::now(),
        }
    }

    /// Check whether a request may go through.
    ///
    /// An open circuit whose reset timeout has elapsed moves to half-open and
    /// admits this call as a probe.
    pub fn allow_request(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let since_failure = self
                    .now_ms()
                    .saturating_sub(self.last_failure_ms.load(Ordering::Acquire));
                if since_failure < self.config.reset_timeout.as_millis() as u64 {
                    return false;
                }

                match self.transition(CircuitState::Open, CircuitState::HalfOpen) {
                    Ok(()) => {
                        self.half_open_successes.store(0, Ordering::Release);
                        info!("Circuit breaker entering half-open state, probing for recovery");
                        true
                    }
                    // Another worker moved the circuit first; follow whatever it decided.
                    Err(current) => current != CircuitState::Open,
                }
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);

        if self.state() != CircuitState::HalfOpen {
            return;
        }

        let successes = self.half_open_successes.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(
            "Circuit breaker half-open probe succeeded ({}/{})",
            successes, self.config.success_threshold
        );
        if successes >= self.config.success_threshold
            && self
                .transition(CircuitState::HalfOpen, CircuitState::Closed)
                .is_ok()
        {
            self.half_open_successes.store(0, Ordering::Release);
            info!("Circuit breaker closed, dependency recovered");
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        self.last_failure_ms.store(self.now_ms(), Ordering::Release);
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;

        match self.state() {
            CircuitState::HalfOpen => {
                if self
                    .transition(CircuitState::HalfOpen, CircuitState::Open)
                    .is_ok()
                {
                    self.half_open_successes.store(0, Ordering::Release);
                    warn!("Circuit breaker probe failed, reopening circuit");
                }
            }
            CircuitState::Closed => {
                if failures >= self.config.failure_threshold
                    && self
                        .transition(CircuitState::Closed, CircuitState::Open)
                        .is_ok()
                {
                    warn!(
                        "Circuit breaker opening after {} consecutive failures",
                        failures
                    );
                }
            }
            // Already open: the refreshed timestamp extends the open window.
            CircuitState::Open => {}
        }
    }

    /// Force the circuit closed and zero all counters
    pub fn reset(&self) {
        self.state
            .store(CircuitState::Closed as u8, Ordering::Release);
        self.consecutive_failures.store(0, Ordering::Release);
        self.half_open_successes.store(0, Ordering::Release);
        self.last_failure_ms.store(0, Ordering::Release);
        info!("Circuit breaker reset");
    }

    /// Get current circuit breaker state
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get current metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        CircuitBreakerMetrics {
            state: self.state(),
            consecutive_failures: self.consecutive_failures.load(Ordering::Acquire),
            half_open_successes: self.half_open_successes.load(Ordering::Acquire),
        }
    }

    fn transition(
        &self,
        from: CircuitState,
        to: CircuitState,
    ) -> std::result::Result<(), CircuitState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(CircuitState::from_u8)
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

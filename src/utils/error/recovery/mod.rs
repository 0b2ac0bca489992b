//! Error recovery and resilience utilities
//!
//! Circuit breaking and retry backoff shared by all workers of a batch.

mod circuit_breaker;
mod retry;
mod types;

pub use circuit_breaker::CircuitBreaker;
pub use retry::RetryPolicy;
pub use types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, RetryConfig};

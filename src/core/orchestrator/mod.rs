//! Batch orchestration
//!
//! [`BatchOrchestrator::run_batch`] filters out checkpointed items, runs the
//! rest on a bounded pool of tokio tasks, and assembles a [`BatchResult`].
//! Per item, each attempt goes through the rate limiter and the circuit
//! breaker before the [`ItemHandler`] is invoked; failures are retried per
//! the retry policy and successes are checkpointed.

mod batch;
mod handler;
mod result;
mod worker;


pub use batch::BatchOrchestrator;
pub use handler::{FnHandler, ItemHandler, handler_fn};
pub use result::{BatchResult, ItemOutcome};

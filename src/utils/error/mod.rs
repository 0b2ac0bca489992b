//! Error handling utilities
//!
//! This module provides the crate error type, the per-item failure taxonomy,
//! and the recovery primitives (circuit breaker, retry policy).

pub mod error;
pub mod failure;
pub mod recovery;

// Re-export commonly used types
pub use error::*;
pub use failure::{ErrorKind, ItemFailure};
pub use recovery::*;

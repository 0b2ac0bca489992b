//! Utility modules for the batch runner
//!
//! - **error**: Error types, the per-item failure taxonomy, and recovery primitives
//! - **logging**: Subscriber setup for `tracing`

pub mod error; // Error handling
pub mod logging; // Logging

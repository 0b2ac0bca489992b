//! Integration tests for batch-review
//!
//! These tests run whole batches through the real components and verify the
//! observable results, checkpoints and metrics.

pub mod batch_tests;
pub mod cancellation_tests;
pub mod config_tests;
pub mod error_handling_tests;
pub mod resume_tests;

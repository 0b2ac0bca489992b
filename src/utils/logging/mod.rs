//! Logging utilities
//!
//! This module installs the global `tracing` subscriber.

mod setup;

pub use setup::{build_filter, init_logging};

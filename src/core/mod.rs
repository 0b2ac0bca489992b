//! Core functionality for the batch runner
//!
//! This module contains the work item model and the execution components.

pub mod checkpoint;
pub mod item;
pub mod orchestrator;
pub mod rate_limiter;

//! Error handling for the batch runner
//!
//! This module defines the crate-level error type and the conversions that
//! classify foreign errors into per-item failures.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod types;

pub use types::{BatchError, Result};

//! Services module
//!
//! Item handlers backed by external processes.

pub mod command;

pub use command::{CommandHandler, classify_exit};

//! Error types for batch execution

use thiserror::Error;

/// Result type alias for batch execution
pub type Result<T> = std::result::Result<T, BatchError>;

/// Main error type for the batch runner
///
/// Per-item failures never surface as a `BatchError`; they are recorded as
/// [`ItemFailure`](crate::utils::error::ItemFailure) outcomes. A `BatchError`
/// means the orchestrator itself, its configuration, or an operator action failed.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Checkpoint storage errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The batch was cancelled before it could start
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

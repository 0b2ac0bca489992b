//! Helper functions for creating specific error types

use super::types::BatchError;

/// Helper functions for creating specific errors
impl BatchError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn checkpoint<S: Into<String>>(message: S) -> Self {
        Self::Checkpoint(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error came from user-supplied input (config or items)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Validation(_) | Self::Yaml(_) | Self::Serialization(_)
        )
    }
}

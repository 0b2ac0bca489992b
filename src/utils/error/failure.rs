//! Per-item failure taxonomy
//!
//! An [`ItemHandler`](crate::core::orchestrator::ItemHandler) reports failure as
//! a tagged [`ItemFailure`] rather than an opaque error, so retry eligibility is
//! a pure function of the [`ErrorKind`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kinds recognized by the retry policy and the metrics aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Connection, DNS, or transport timeout
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// The remote analysis service reported a failure
    #[serde(rename = "SERVICE_ERROR")]
    Service,
    /// The remote side throttled the call
    #[serde(rename = "RATE_LIMIT")]
    RateLimit,
    /// Local misconfiguration; retrying cannot help
    #[serde(rename = "CONFIG_ERROR")]
    Config,
    /// The item itself is malformed; retrying cannot help
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Anything unrecognized
    #[serde(rename = "UNKNOWN_ERROR")]
    Unknown,
}

impl ErrorKind {
    /// All kinds, in metrics slot order
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Network,
        ErrorKind::Service,
        ErrorKind::RateLimit,
        ErrorKind::Config,
        ErrorKind::Validation,
        ErrorKind::Unknown,
    ];

    /// Stable name used in logs, reports and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Service => "SERVICE_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::Config => "CONFIG_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Fixed retry eligibility table
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Network | ErrorKind::Service | ErrorKind::RateLimit => true,
            ErrorKind::Config | ErrorKind::Validation => false,
            ErrorKind::Unknown => true,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ErrorKind::Network => 0,
            ErrorKind::Service => 1,
            ErrorKind::RateLimit => 2,
            ErrorKind::Config => 3,
            ErrorKind::Validation => 4,
            ErrorKind::Unknown => 5,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed invocation of the item handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemFailure {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn service<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    pub fn rate_limit<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ItemFailure {}

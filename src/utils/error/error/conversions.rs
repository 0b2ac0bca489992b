//! Classification of recognized foreign errors into item failures

use super::types::BatchError;
use crate::utils::error::failure::{ErrorKind, ItemFailure};
use std::io::ErrorKind as IoKind;

impl From<std::io::Error> for ItemFailure {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            IoKind::ConnectionRefused
            | IoKind::ConnectionReset
            | IoKind::ConnectionAborted
            | IoKind::NotConnected
            | IoKind::AddrNotAvailable
            | IoKind::BrokenPipe
            | IoKind::TimedOut
            | IoKind::Interrupted
            | IoKind::UnexpectedEof => ErrorKind::Network,
            IoKind::InvalidInput | IoKind::InvalidData => ErrorKind::Validation,
            IoKind::NotFound | IoKind::PermissionDenied => ErrorKind::Config,
            _ => ErrorKind::Unknown,
        };
        ItemFailure::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for ItemFailure {
    fn from(err: serde_json::Error) -> Self {
        ItemFailure::validation(format!("Invalid JSON: {}", err))
    }
}

impl From<reqwest::Error> for ItemFailure {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() {
            ErrorKind::Network
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => ErrorKind::RateLimit,
                500..=599 => ErrorKind::Service,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::Unknown,
            }
        } else if err.is_decode() || err.is_body() {
            ErrorKind::Validation
        } else if err.is_request() {
            ErrorKind::Network
        } else {
            ErrorKind::Unknown
        };
        ItemFailure::new(kind, err.to_string())
    }
}

impl From<BatchError> for ItemFailure {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Config(message) => ItemFailure::config(message),
            BatchError::Validation(message) => ItemFailure::validation(message),
            BatchError::Serialization(e) => e.into(),
            BatchError::Io(e) => e.into(),
            other => ItemFailure::unknown(other.to_string()),
        }
    }
}

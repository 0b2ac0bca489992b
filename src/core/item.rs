//! Work items and their lifecycle states

use crate::utils::error::{BatchError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// One unit of batch work
///
/// `id` is the idempotency key: an item whose id has a checkpoint is never
/// handed to the handler again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    #[serde(default)]
    pub payload: Value,
}

impl WorkItem {
    pub fn new<S: Into<String>>(id: S, payload: Value) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

/// Per-item state: `PENDING → (SKIPPED | RUNNING) → (SUCCEEDED | FAILED | CANCELLED)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Running,
    /// Completed in an earlier run
    Skipped,
    Succeeded,
    Failed,
    /// Never dispatched, or stopped by cancellation before completing
    Cancelled,
}

impl ItemStatus {
    /// Terminal states are final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemStatus::Pending | ItemStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "PENDING",
            ItemStatus::Running => "RUNNING",
            ItemStatus::Skipped => "SKIPPED",
            ItemStatus::Succeeded => "SUCCEEDED",
            ItemStatus::Failed => "FAILED",
            ItemStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a JSON array of items, or one item per line (JSON lines)
pub fn parse_items(content: &str) -> Result<Vec<WorkItem>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| BatchError::validation(format!("Invalid item list: {}", e)));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| BatchError::validation(format!("Invalid item on line {}: {}", n + 1, e)))
        })
        .collect()
}

/// Read and parse an items file
pub async fn load_items<P: AsRef<Path>>(path: P) -> Result<Vec<WorkItem>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        BatchError::validation(format!("Failed to read items from {}: {}", path.display(), e))
    })?;
    parse_items(&content)
}

//! Checkpoint record and storage backend seam

use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Durable marker that a work item completed successfully
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointRecord {
    pub item_id: String,
    /// Payload the handler returned for the item
    pub result_payload: Value,
    pub completed_at_epoch_ms: i64,
}

impl CheckpointRecord {
    pub fn new<S: Into<String>>(item_id: S, result_payload: Value, completed_at_epoch_ms: i64) -> Self {
        Self {
            item_id: item_id.into(),
            result_payload,
            completed_at_epoch_ms,
        }
    }
}

/// Durable storage for checkpoint records, one record per item id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckpointBackend: Send + Sync {
    /// Persist a record, replacing any previous record for the same id
    async fn save(&self, record: &CheckpointRecord) -> Result<()>;

    /// Read a record. `Ok(None)` when the item has no record.
    async fn load(&self, item_id: &str) -> Result<Option<CheckpointRecord>>;

    /// Whether a record exists for the item
    async fn exists(&self, item_id: &str) -> Result<bool>;

    /// Delete every record. Returns how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// All readable records, ordered by item id
    async fn records(&self) -> Result<Vec<CheckpointRecord>>;
}

//! In-memory read-through cache over a durable checkpoint backend

use super::file::FileCheckpointBackend;
use super::types::{CheckpointBackend, CheckpointRecord};
use crate::config::CheckpointConfig;
use crate::utils::error::Result;
use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Ledger of completed work items
///
/// The memory tier is authoritative for the current process. The optional
/// durable tier makes completed items visible to later runs. Durable write
/// failures are logged and counted, never returned: losing a checkpoint only
/// means the item runs again on resume.
pub struct CheckpointStore {
    memory: DashMap<String, CheckpointRecord>,
    backend: Option<Arc<dyn CheckpointBackend>>,
    enabled: bool,
    persist_failures: AtomicU64,
}

impl fmt::Debug for CheckpointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointStore")
            .field("cached", &self.memory.len())
            .field("durable", &self.backend.is_some())
            .field("enabled", &self.enabled)
            .field("persist_failures", &self.persist_failures())
            .finish()
    }
}

impl CheckpointStore {
    /// Wrap a durable backend
    pub fn new(backend: Arc<dyn CheckpointBackend>) -> Self {
        Self::build(Some(backend), true)
    }

    /// File-backed store under `directory`
    pub fn file<P: Into<PathBuf>>(directory: P) -> Self {
        let backend = FileCheckpointBackend::new(directory);
        info!(
            "Checkpointing enabled, storing records in {}",
            backend.base_path().display()
        );
        Self::new(Arc::new(backend))
    }

    /// Process-local store with no durable tier
    pub fn in_memory() -> Self {
        Self::build(None, true)
    }

    /// A store that never reports an item as done and never writes
    pub fn disabled() -> Self {
        Self::build(None, false)
    }

    pub fn from_config(config: &CheckpointConfig) -> Self {
        if config.enabled {
            Self::file(config.directory.clone())
        } else {
            Self::disabled()
        }
    }

    fn build(backend: Option<Arc<dyn CheckpointBackend>>, enabled: bool) -> Self {
        Self {
            memory: DashMap::new(),
            backend,
            enabled,
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Record an item as completed.
    ///
    /// The memory tier is updated before this returns; the durable write is
    /// awaited but its failure is swallowed.
    pub async fn save(&self, item_id: &str, result_payload: Value, completed_at_epoch_ms: i64) {
        if !self.enabled {
            return;
        }

        let record = CheckpointRecord::new(item_id, result_payload, completed_at_epoch_ms);
        self.memory.insert(item_id.to_string(), record.clone());

        if let Some(backend) = &self.backend {
            if let Err(e) = backend.save(&record).await {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to persist checkpoint for {}: {}", item_id, e);
            }
        }
    }

    /// Look up an item's record, memory first, caching durable hits
    pub async fn load(&self, item_id: &str) -> Option<CheckpointRecord> {
        if !self.enabled {
            return None;
        }
        if let Some(record) = self.memory.get(item_id) {
            return Some(record.clone());
        }

        let backend = self.backend.as_ref()?;
        match backend.load(item_id).await {
            Ok(Some(record)) => {
                self.memory.insert(item_id.to_string(), record.clone());
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring unreadable checkpoint for {}: {}", item_id, e);
                None
            }
        }
    }

    /// Whether the item has completed, in this run or a previous one
    pub async fn exists(&self, item_id: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.memory.contains_key(item_id) {
            return true;
        }

        let Some(backend) = &self.backend else {
            return false;
        };
        match backend.exists(item_id).await {
            // Read it through so a corrupt record counts as absent.
            Ok(true) => self.load(item_id).await.is_some(),
            Ok(false) => false,
            Err(e) => {
                warn!("Failed to check checkpoint for {}: {}", item_id, e);
                false
            }
        }
    }

    /// Drop every record from both tiers. Returns how many durable records were removed.
    pub async fn clear(&self) -> Result<usize> {
        let cached = self.memory.len();
        self.memory.clear();

        match &self.backend {
            Some(backend) if self.enabled => {
                let removed = backend.clear().await?;
                info!("Cleared {} checkpoint records", removed);
                Ok(removed)
            }
            _ => Ok(cached),
        }
    }

    /// All known records, ordered by item id
    pub async fn records(&self) -> Result<Vec<CheckpointRecord>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        if let Some(backend) = &self.backend {
            return backend.records().await;
        }

        let mut records: Vec<CheckpointRecord> =
            self.memory.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        Ok(records)
    }

    /// Number of records in the memory tier
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_durable(&self) -> bool {
        self.backend.is_some()
    }

    /// Durable writes that failed and were swallowed
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }
}

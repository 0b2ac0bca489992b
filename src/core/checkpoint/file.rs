//! Local file system checkpoint backend

use super::types::{CheckpointBackend, CheckpointRecord};
use crate::utils::error::{BatchError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind as IoKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const RECORD_EXTENSION: &str = ".json";
const TEMP_EXTENSION: &str = ".tmp";
/// Longest file name most file systems accept
const MAX_FILE_NAME_LEN: usize = 255;
/// Marks a hashed file name; never produced by the percent encoding
const HASHED_PREFIX: char = '~';

/// One JSON file per item under a checkpoint directory
#[derive(Debug, Clone)]
pub struct FileCheckpointBackend {
    base_path: PathBuf,
}

impl FileCheckpointBackend {
    /// Create a backend rooted at `base_path`. The directory is created on first save.
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the record path for a given item id
    pub fn record_path(&self, item_id: &str) -> PathBuf {
        self.base_path.join(record_file_name(item_id))
    }

    async fn read_record(path: &Path) -> Result<Option<CheckpointRecord>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == IoKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BatchError::checkpoint(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let record = serde_json::from_str(&content).map_err(|e| {
            BatchError::checkpoint(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(record))
    }

    async fn record_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BatchError::checkpoint(format!(
                    "Failed to read directory {}: {}",
                    self.base_path.display(),
                    e
                )));
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BatchError::checkpoint(format!("Failed to read entry: {}", e)))?
        {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.ends_with(RECORD_EXTENSION) || file_name.ends_with(TEMP_EXTENSION) {
                files.push(entry.path());
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl CheckpointBackend for FileCheckpointBackend {
    async fn save(&self, record: &CheckpointRecord) -> Result<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            BatchError::checkpoint(format!("Failed to create checkpoint directory: {}", e))
        })?;

        let content = serde_json::to_vec_pretty(record)?;
        let final_path = self.record_path(&record.item_id);
        // Write then rename so a crash never leaves a half-written record behind.
        let temp_path = self
            .base_path
            .join(format!(".{}{}", Uuid::new_v4(), TEMP_EXTENSION));

        fs::write(&temp_path, content)
            .await
            .map_err(|e| BatchError::checkpoint(format!("Failed to write record: {}", e)))?;
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(BatchError::checkpoint(format!(
                "Failed to move record into place: {}",
                e
            )));
        }

        debug!("Checkpoint stored: {} -> {}", record.item_id, final_path.display());
        Ok(())
    }

    async fn load(&self, item_id: &str) -> Result<Option<CheckpointRecord>> {
        Self::read_record(&self.record_path(item_id)).await
    }

    async fn exists(&self, item_id: &str) -> Result<bool> {
        fs::try_exists(self.record_path(item_id))
            .await
            .map_err(|e| BatchError::checkpoint(format!("Failed to stat record: {}", e)))
    }

    async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.record_files().await? {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    if path.to_string_lossy().ends_with(RECORD_EXTENSION) {
                        removed += 1;
                    }
                }
                Err(e) if e.kind() == IoKind::NotFound => {}
                Err(e) => {
                    return Err(BatchError::checkpoint(format!(
                        "Failed to delete {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
        debug!("Removed {} checkpoint records", removed);
        Ok(removed)
    }

    async fn records(&self) -> Result<Vec<CheckpointRecord>> {
        let mut records = Vec::new();
        for path in self.record_files().await? {
            if !path.to_string_lossy().ends_with(RECORD_EXTENSION) {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable checkpoint: {}", e),
            }
        }
        records.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        Ok(records)
    }
}

/// Map an item id to a file name, injectively.
///
/// Bytes outside `[A-Za-z0-9._-]` become `%XX`, so path separators and other
/// special characters in ids never escape the checkpoint directory. Names that
/// would exceed the file system limit fall back to `~<sha256 of id>.json`.
pub(crate) fn record_file_name(item_id: &str) -> String {
    let mut name = String::with_capacity(item_id.len() + RECORD_EXTENSION.len());
    for byte in item_id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
            // A leading dot would hide the file and collide with temp files.
            b'.' if !name.is_empty() => name.push('.'),
            _ => name.push_str(&format!("%{:02X}", byte)),
        }
    }
    name.push_str(RECORD_EXTENSION);

    if name.len() > MAX_FILE_NAME_LEN {
        let mut hasher = Sha256::new();
        hasher.update(item_id.as_bytes());
        return format!(
            "{}{}{}",
            HASHED_PREFIX,
            hex::encode(hasher.finalize()),
            RECORD_EXTENSION
        );
    }
    name
}

//! Checkpoint storage configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Checkpoint storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// When disabled, nothing is skipped and nothing is written
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory holding one JSON record per completed item
    #[serde(default = "default_checkpoint_dir")]
    pub directory: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_checkpoint_dir(),
        }
    }
}

//! External command handler configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Command run once per work item by the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Program followed by its arguments
    #[serde(default)]
    pub command: Vec<String>,
    /// Per-call timeout, 0 for none
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl HandlerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}

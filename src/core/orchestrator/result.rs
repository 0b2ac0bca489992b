//! Per-item outcomes and the aggregate batch result

use crate::core::checkpoint::CheckpointRecord;
use crate::core::item::ItemStatus;
use crate::monitoring::metrics::MetricsSnapshot;
use crate::utils::error::{ItemFailure, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use uuid::Uuid;

/// Terminal state of one work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item_id: String,
    pub status: ItemStatus,
    /// Attempts consumed, including ones rejected by an open circuit
    pub attempts: u32,
    /// Last failure, for failed and cancelled items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Numeric `score` field of the result payload, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ItemOutcome {
    pub fn succeeded<S: Into<String>>(item_id: S, attempts: u32, result: Value) -> Self {
        Self {
            item_id: item_id.into(),
            status: ItemStatus::Succeeded,
            attempts,
            error: None,
            score: score_of(&result),
            result: Some(result),
        }
    }

    pub fn failed<S: Into<String>>(item_id: S, attempts: u32, error: ItemFailure) -> Self {
        Self {
            item_id: item_id.into(),
            status: ItemStatus::Failed,
            attempts,
            error: Some(error),
            result: None,
            score: None,
        }
    }

    /// Already completed in an earlier run; carries the stored result when readable
    pub fn skipped<S: Into<String>>(item_id: S, record: Option<CheckpointRecord>) -> Self {
        let result = record.map(|r| r.result_payload);
        Self {
            item_id: item_id.into(),
            status: ItemStatus::Skipped,
            attempts: 0,
            error: None,
            score: result.as_ref().and_then(score_of),
            result,
        }
    }

    pub fn cancelled<S: Into<String>>(
        item_id: S,
        attempts: u32,
        last_error: Option<ItemFailure>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            status: ItemStatus::Cancelled,
            attempts,
            error: last_error,
            result: None,
            score: None,
        }
    }
}

fn score_of(result: &Value) -> Option<f64> {
    result.get("score").and_then(Value::as_f64)
}

/// Aggregate of one `run_batch` call, immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: usize,
    /// One entry per input item, in input order
    pub outcomes: Vec<ItemOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub metrics: MetricsSnapshot,
    pub checkpoint_persist_failures: u64,
}

impl BatchResult {
    pub(crate) fn new(
        run_id: Uuid,
        outcomes: Vec<ItemOutcome>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        metrics: MetricsSnapshot,
        checkpoint_persist_failures: u64,
    ) -> Self {
        let count = |status: ItemStatus| outcomes.iter().filter(|o| o.status == status).count();
        Self {
            run_id,
            total: outcomes.len(),
            succeeded: count(ItemStatus::Succeeded),
            failed: count(ItemStatus::Failed),
            skipped: count(ItemStatus::Skipped),
            cancelled: count(ItemStatus::Cancelled),
            outcomes,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
            metrics,
            checkpoint_persist_failures,
        }
    }

    /// True when no item failed or was cancelled
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }

    pub fn outcome(&self, item_id: &str) -> Option<&ItemOutcome> {
        self.outcomes.iter().find(|o| o.item_id == item_id)
    }

    pub fn failed_items(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ItemStatus::Failed)
    }

    /// Mean score over items that reported one
    pub fn average_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self.outcomes.iter().filter_map(|o| o.score).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }

    /// Human-readable report: counts, per-item table, failures listed separately
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Batch {} ===", self.run_id);
        let _ = writeln!(
            out,
            "Total: {}  Succeeded: {}  Failed: {}  Skipped (already done): {}  Cancelled: {}",
            self.total, self.succeeded, self.failed, self.skipped, self.cancelled
        );
        let _ = writeln!(out, "Duration: {} ms", self.duration_ms);
        if let Some(score) = self.average_score() {
            let _ = writeln!(out, "Average score: {:.1}", score);
        }
        if self.checkpoint_persist_failures > 0 {
            let _ = writeln!(
                out,
                "Checkpoint write failures: {} (these items will run again on resume)",
                self.checkpoint_persist_failures
            );
        }

        let id_width = self
            .outcomes
            .iter()
            .map(|o| o.item_id.len())
            .max()
            .unwrap_or(0)
            .max("ITEM".len());
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<width$}  {:<9}  {:>8}  {:>5}  DETAIL",
            "ITEM",
            "STATUS",
            "ATTEMPTS",
            "SCORE",
            width = id_width
        );
        for outcome in &self.outcomes {
            let score = outcome
                .score
                .map(|s| format!("{:.1}", s))
                .unwrap_or_else(|| "-".to_string());
            let detail = match (outcome.status, &outcome.error) {
                (ItemStatus::Skipped, _) => "already done".to_string(),
                (_, Some(error)) => error.to_string(),
                _ => String::new(),
            };
            let _ = writeln!(
                out,
                "{:<width$}  {:<9}  {:>8}  {:>5}  {}",
                outcome.item_id,
                outcome.status.as_str(),
                outcome.attempts,
                score,
                detail,
                width = id_width
            );
        }

        if self.failed > 0 {
            let _ = writeln!(out);
            let _ = writeln!(out, "Failed items:");
            for outcome in self.failed_items() {
                if let Some(error) = &outcome.error {
                    let _ = writeln!(
                        out,
                        "  ✗ {} [{}] {}",
                        outcome.item_id, error.kind, error.message
                    );
                }
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "{}", self.metrics);
        out
    }

    /// Write the result as a JSON artifact
    pub async fn write_summary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

impl std::fmt::Display for BatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render_summary())
    }
}

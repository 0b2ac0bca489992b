//! Test fixtures and data factories

use batch_review::WorkItem;
use serde_json::json;

/// Factory for creating work items
pub struct ItemFactory;

impl ItemFactory {
    /// `item-0` .. `item-{n-1}`, each carrying its index
    pub fn batch(n: usize) -> Vec<WorkItem> {
        (0..n).map(Self::indexed).collect()
    }

    pub fn indexed(index: usize) -> WorkItem {
        WorkItem::new(
            format!("item-{}", index),
            json!({ "index": index, "code": format!("fn f{}() {{}}", index) }),
        )
    }

    /// Items named after source file chunks, ids that are unsafe as raw file names
    pub fn source_chunks() -> Vec<WorkItem> {
        ["src/main.rs#1", "src/main.rs#2", "src/core/mod.rs#1", "../outside#1"]
            .into_iter()
            .map(|id| WorkItem::new(id, json!({ "path": id })))
            .collect()
    }
}

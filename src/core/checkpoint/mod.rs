//! Checkpoint ledger for resumable batch runs
//!
//! [`CheckpointStore`] caches records in memory in front of a swappable
//! [`CheckpointBackend`]. [`FileCheckpointBackend`] keeps one JSON file per
//! item so a later process can skip work that already completed.

mod file;
mod store;
mod types;


pub use file::FileCheckpointBackend;
pub use store::CheckpointStore;
pub use types::{CheckpointBackend, CheckpointRecord};

//! Resume tests
//!
//! A restarted run with the same checkpoint directory skips completed items
//! and re-runs everything else.

#[cfg(test)]
mod tests {
    use crate::common::assertions::BatchResultAssertions;
    use crate::common::{ItemFactory, ScriptedHandler, fast_orchestrator};
    use batch_review::{CheckpointStore, FileCheckpointBackend, ItemFailure, ItemStatus};
    use std::sync::Arc;

    fn file_store(dir: &std::path::Path) -> Arc<CheckpointStore> {
        Arc::new(CheckpointStore::file(dir))
    }

    #[tokio::test]
    async fn test_restart_skips_completed_items() {
        let dir = tempfile::tempdir().unwrap();

        // First run: one item keeps failing
        let first = fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(
                ItemFactory::batch(5),
                Arc::new(
                    ScriptedHandler::new()
                        .always_fail("item-2", ItemFailure::validation("unparseable chunk")),
                ),
            )
            .await
            .unwrap();
        assert_eq!(first.succeeded, 4);
        assert_eq!(first.failed, 1);

        // Second run in a "new process": fresh store over the same directory
        let handler = Arc::new(ScriptedHandler::new());
        let second = fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(ItemFactory::batch(5), handler.clone())
            .await
            .unwrap();

        second.assert_accounted_for(5);
        assert_eq!(second.skipped, 4);
        assert_eq!(second.succeeded, 1);
        assert_eq!(handler.total_calls(), 1);
        assert_eq!(handler.calls("item-2"), 1);
        second.assert_status("item-0", ItemStatus::Skipped);
        assert!(second.is_complete());

        // Skipped outcomes carry the stored result
        let skipped = second.outcome("item-3").unwrap();
        assert_eq!(skipped.attempts, 0);
        assert_eq!(skipped.score, Some(3.0));
    }

    #[tokio::test]
    async fn test_third_run_invokes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..2 {
            fast_orchestrator(3)
                .with_checkpoint_store(file_store(dir.path()))
                .run_batch(ItemFactory::batch(6), Arc::new(ScriptedHandler::new()))
                .await
                .unwrap();
        }

        let handler = Arc::new(ScriptedHandler::new());
        let result = fast_orchestrator(3)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(ItemFactory::batch(6), handler.clone())
            .await
            .unwrap();

        assert_eq!(result.skipped, 6);
        assert_eq!(handler.total_calls(), 0);
        assert_eq!(result.metrics.total_requests, 0);
    }

    #[tokio::test]
    async fn test_records_survive_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let items = ItemFactory::source_chunks();

        fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(items.clone(), Arc::new(ScriptedHandler::new()))
            .await
            .unwrap();

        let backend = FileCheckpointBackend::new(dir.path());
        for item in &items {
            let path = backend.record_path(&item.id);
            assert!(path.exists(), "missing record for {}", item.id);
            assert_eq!(path.parent(), Some(dir.path()));
        }

        let records = CheckpointStore::file(dir.path()).records().await.unwrap();
        let mut ids: Vec<&str> = records.iter().map(|r| r.item_id.as_str()).collect();
        ids.sort();
        let mut expected: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reprocessed() {
        let dir = tempfile::tempdir().unwrap();
        fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(ItemFactory::batch(3), Arc::new(ScriptedHandler::new()))
            .await
            .unwrap();

        let path = FileCheckpointBackend::new(dir.path()).record_path("item-1");
        tokio::fs::write(&path, b"{ truncated").await.unwrap();

        let handler = Arc::new(ScriptedHandler::new());
        let result = fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(ItemFactory::batch(3), handler.clone())
            .await
            .unwrap();

        assert_eq!(handler.total_calls(), 1);
        result.assert_status("item-1", ItemStatus::Succeeded);
        assert_eq!(result.skipped, 2);
    }

    #[tokio::test]
    async fn test_cleared_store_reprocesses_everything() {
        let dir = tempfile::tempdir().unwrap();
        fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(ItemFactory::batch(4), Arc::new(ScriptedHandler::new()))
            .await
            .unwrap();

        let removed = CheckpointStore::file(dir.path()).clear().await.unwrap();
        assert_eq!(removed, 4);

        let handler = Arc::new(ScriptedHandler::new());
        fast_orchestrator(2)
            .with_checkpoint_store(file_store(dir.path()))
            .run_batch(ItemFactory::batch(4), handler.clone())
            .await
            .unwrap();
        assert_eq!(handler.total_calls(), 4);
    }
}

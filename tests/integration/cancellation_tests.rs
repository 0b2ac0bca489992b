//! Cancellation tests

#[cfg(test)]
mod tests {
    use crate::common::assertions::BatchResultAssertions;
    use crate::common::{ItemFactory, ScriptedHandler, fast_orchestrator};
    use batch_review::{BatchError, CheckpointStore, ItemStatus};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_cancelled_items_run_on_resume() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CheckpointStore::file(dir.path()));

        let token = CancellationToken::new();
        let orchestrator = fast_orchestrator(1)
            .with_checkpoint_store(store.clone())
            .with_shutdown_timeout(Duration::from_secs(5))
            .with_cancellation_token(token.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let first = orchestrator
            .run_batch(
                ItemFactory::batch(6),
                Arc::new(ScriptedHandler::new().with_delay(Duration::from_millis(30))),
            )
            .await
            .unwrap();

        first.assert_accounted_for(6);
        assert!(first.succeeded >= 1);
        assert!(first.cancelled >= 1);
        assert_eq!(first.succeeded + first.cancelled, 6);
        assert_eq!(first.failed, 0);
        for outcome in first.outcomes.iter().filter(|o| o.status == ItemStatus::Cancelled) {
            assert!(outcome.error.is_none());
        }

        // A new run with a fresh token picks up exactly the cancelled items
        let handler = Arc::new(ScriptedHandler::new());
        let second = fast_orchestrator(2)
            .with_checkpoint_store(Arc::new(CheckpointStore::file(dir.path())))
            .run_batch(ItemFactory::batch(6), handler.clone())
            .await
            .unwrap();

        assert_eq!(second.skipped, first.succeeded);
        assert_eq!(handler.total_calls() as usize, first.cancelled);
        assert!(second.is_complete());
    }

    #[tokio::test]
    async fn test_external_token_is_honored() {
        let token = CancellationToken::new();
        let orchestrator = fast_orchestrator(2).with_cancellation_token(token.clone());
        token.cancel();

        let result = orchestrator
            .run_batch(ItemFactory::batch(2), Arc::new(ScriptedHandler::new()))
            .await;
        assert!(matches!(result, Err(BatchError::Cancelled(_))));
        assert!(orchestrator.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_hung_items_are_aborted_after_timeout() {
        let orchestrator =
            fast_orchestrator(3).with_shutdown_timeout(Duration::from_millis(50));
        let token = orchestrator.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let handler = Arc::new(ScriptedHandler::new().with_delay(Duration::from_secs(60)));
        let started = std::time::Instant::now();
        let result = orchestrator
            .run_batch(ItemFactory::batch(5), handler.clone())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        result.assert_accounted_for(5);
        assert_eq!(result.cancelled, 5);
        assert_eq!(handler.total_calls(), 3);
        assert!(orchestrator.checkpoint_store().is_empty());
    }
}

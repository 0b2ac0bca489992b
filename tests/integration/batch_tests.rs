//! End-to-end batch tests
//!
//! Retries, failure isolation, summary rendering and the JSON artifact.

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::common::assertions::BatchResultAssertions;
    use crate::common::{ItemFactory, ScriptedHandler, fast_orchestrator, fast_retry};
    use batch_review::{
        BatchResult, CircuitBreaker, CircuitBreakerConfig, ErrorKind, ItemFailure, ItemStatus,
    };
    use std::sync::Arc;

    // ==================== Retries ====================

    #[tokio::test]
    async fn test_transient_failures_recover() {
        let orchestrator = fast_orchestrator(2);
        let handler = Arc::new(
            ScriptedHandler::new()
                .fail_first("item-3", 1, ItemFailure::network("connection reset"))
                .fail_first("item-7", 1, ItemFailure::network("connection reset")),
        );

        let result = orchestrator
            .run_batch(ItemFactory::batch(10), handler.clone())
            .await
            .unwrap();

        result.assert_accounted_for(10);
        assert_eq!(result.succeeded, 10);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 0);
        assert!(result.is_complete());

        assert_eq!(handler.total_calls(), 12);
        assert_eq!(handler.calls("item-3"), 2);
        assert_eq!(handler.calls("item-4"), 1);

        let metrics = &result.metrics;
        assert_eq!(metrics.total_requests, 12);
        assert_eq!(metrics.successful_requests, 10);
        assert_eq!(metrics.failed_requests, 2);
        assert_eq!(metrics.retried_requests, 2);
        assert_eq!(metrics.errors(ErrorKind::Network), 2);
        assert_approx_eq!(metrics.success_rate(), 1000.0 / 12.0);
    }

    #[tokio::test]
    async fn test_failure_kinds_decide_retries() {
        // Seven failures in total; keep the breaker out of the way
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 100,
            ..Default::default()
        });
        let orchestrator = fast_orchestrator(3)
            .with_retry_policy(fast_retry(2))
            .with_circuit_breaker(Arc::new(breaker));
        let handler = Arc::new(
            ScriptedHandler::new()
                .always_fail("item-0", ItemFailure::validation("chunk is empty"))
                .always_fail("item-1", ItemFailure::config("missing API key"))
                .always_fail("item-2", ItemFailure::rate_limit("429 Too Many Requests"))
                .fail_first("item-3", 2, ItemFailure::service("503 Service Unavailable")),
        );

        let result = orchestrator
            .run_batch(ItemFactory::batch(5), handler.clone())
            .await
            .unwrap();

        result.assert_accounted_for(5);
        assert_eq!(handler.calls("item-0"), 1);
        assert_eq!(handler.calls("item-1"), 1);
        assert_eq!(handler.calls("item-2"), 3);
        assert_eq!(handler.calls("item-3"), 3);

        result.assert_status("item-0", ItemStatus::Failed);
        result.assert_status("item-1", ItemStatus::Failed);
        result.assert_status("item-2", ItemStatus::Failed);
        result.assert_status("item-3", ItemStatus::Succeeded);
        result.assert_status("item-4", ItemStatus::Succeeded);

        let rate_limited = result.outcome("item-2").unwrap();
        assert_eq!(rate_limited.attempts, 3);
        assert_eq!(
            rate_limited.error,
            Some(ItemFailure::rate_limit("429 Too Many Requests"))
        );
        assert_eq!(result.metrics.errors(ErrorKind::Validation), 1);
        assert_eq!(result.metrics.errors(ErrorKind::Config), 1);
        assert_eq!(result.metrics.errors(ErrorKind::RateLimit), 3);
        assert_eq!(result.metrics.errors(ErrorKind::Service), 2);
    }

    // ==================== Isolation ====================

    #[tokio::test]
    async fn test_panicking_item_does_not_abort_batch() {
        let orchestrator = fast_orchestrator(4).with_retry_policy(fast_retry(0));
        let handler = Arc::new(ScriptedHandler::new().panic_on("item-5"));

        let result = orchestrator
            .run_batch(ItemFactory::batch(8), handler.clone())
            .await
            .unwrap();

        result.assert_accounted_for(8);
        assert_eq!(result.succeeded, 7);
        result.assert_status("item-5", ItemStatus::Failed);
        let error = result.outcome("item-5").unwrap().error.clone().unwrap();
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert!(error.message.contains("scripted panic for item-5"));
        assert_eq!(orchestrator.checkpoint_store().len(), 7);
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order() {
        let items = ItemFactory::source_chunks();
        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();

        let result = fast_orchestrator(4)
            .run_batch(items, Arc::new(ScriptedHandler::new()))
            .await
            .unwrap();

        let outcome_ids: Vec<String> = result.outcomes.iter().map(|o| o.item_id.clone()).collect();
        assert_eq!(outcome_ids, ids);
    }

    // ==================== Reporting ====================

    #[tokio::test]
    async fn test_summary_lists_failures_distinctly() {
        let orchestrator = fast_orchestrator(2);
        let handler = Arc::new(
            ScriptedHandler::new().always_fail("item-1", ItemFailure::validation("chunk is empty")),
        );

        let result = orchestrator
            .run_batch(ItemFactory::batch(3), handler)
            .await
            .unwrap();
        let summary = result.render_summary();

        assert!(summary.contains(&format!("=== Batch {} ===", result.run_id)));
        assert!(summary.contains("Succeeded: 2"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("Failed items:"));
        assert!(summary.contains("✗ item-1 [VALIDATION_ERROR] chunk is empty"));
        assert!(summary.contains("=== Performance Metrics ==="));
        assert!(!result.is_complete());
    }

    #[tokio::test]
    async fn test_summary_artifact_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("batch.json");

        let result = fast_orchestrator(2)
            .run_batch(ItemFactory::batch(4), Arc::new(ScriptedHandler::new()))
            .await
            .unwrap();
        result.write_summary(&path).await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        let parsed: BatchResult = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.run_id, result.run_id);
        assert_eq!(parsed.succeeded, 4);
        assert_eq!(parsed.outcomes, result.outcomes);
        assert_eq!(parsed.metrics, result.metrics);

        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "SUCCEEDED");
        assert_eq!(json["outcomes"][2]["score"], 2.0);
    }
}

//! Configuration wiring tests
//!
//! A YAML file drives every component of the orchestrator.

#[cfg(test)]
mod tests {
    use crate::common::{ItemFactory, ScriptedHandler};
    use batch_review::{BatchError, BatchOrchestrator, CommandHandler, Config};
    use std::sync::Arc;
    use std::time::Duration;

    fn yaml_with_checkpoint_dir(dir: &std::path::Path) -> String {
        format!(
            r#"
batch:
  pool_size: 3
  shutdown_timeout_ms: 2000
rate_limit:
  permits_per_second: 500
circuit_breaker:
  failure_threshold: 4
  reset_timeout_ms: 1000
  half_open_successes: 2
retry:
  max_retries: 1
  initial_delay_ms: 1
  max_delay_ms: 2
  jitter: false
checkpoint:
  directory: "{}"
handler:
  command: ["sh", "-c", "cat"]
  timeout_ms: 5000
"#,
            dir.display()
        )
    }

    #[tokio::test]
    async fn test_orchestrator_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_yaml(&yaml_with_checkpoint_dir(dir.path())).unwrap();

        let orchestrator = BatchOrchestrator::from_config(&config).unwrap();

        assert_eq!(orchestrator.pool_size(), 3);
        assert_eq!(orchestrator.rate_limiter().capacity(), 500);
        assert_eq!(orchestrator.retry_policy().max_retries(), 1);
        assert!(!orchestrator.retry_policy().config().jitter);
        let breaker = orchestrator.circuit_breaker().config();
        assert_eq!(breaker.failure_threshold, 4);
        assert_eq!(breaker.success_threshold, 2);
        assert_eq!(breaker.reset_timeout, Duration::from_secs(1));
        assert!(orchestrator.checkpoint_store().is_enabled());
        assert!(orchestrator.checkpoint_store().is_durable());

        let result = orchestrator
            .run_batch(ItemFactory::batch(4), Arc::new(ScriptedHandler::new()))
            .await
            .unwrap();
        assert_eq!(result.succeeded, 4);

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[tokio::test]
    async fn test_disabled_checkpoints_from_config() {
        let config = Config::from_yaml("checkpoint:\n  enabled: false\n").unwrap();
        let orchestrator = BatchOrchestrator::from_config(&config).unwrap();
        assert!(!orchestrator.checkpoint_store().is_enabled());

        let handler = Arc::new(ScriptedHandler::new());
        for _ in 0..2 {
            orchestrator
                .run_batch(ItemFactory::batch(2), handler.clone())
                .await
                .unwrap();
        }
        assert_eq!(handler.total_calls(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.retry.multiplier = 0.5;

        let result = BatchOrchestrator::from_config(&config);
        assert!(matches!(result, Err(BatchError::Config(msg)) if msg.contains("Retry config error")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_handler_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_yaml(&yaml_with_checkpoint_dir(dir.path())).unwrap();

        let handler = CommandHandler::from_config(&config.handler).unwrap();
        let result = BatchOrchestrator::from_config(&config)
            .unwrap()
            .run_batch(ItemFactory::batch(3), handler)
            .await
            .unwrap();

        assert_eq!(result.succeeded, 3);
        let echoed = result.outcome("item-1").unwrap().result.clone().unwrap();
        assert_eq!(echoed["id"], "item-1");
        assert_eq!(echoed["payload"]["index"], 1);
    }
}

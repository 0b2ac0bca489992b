//! Error handling integration tests
//!
//! Classification of foreign errors into item failures, and the retry table.

#[cfg(test)]
mod tests {
    use batch_review::{BatchError, ErrorKind, ItemFailure, RetryPolicy};
    use std::io;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) -> String {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
        format!("{}{}", server.uri(), route)
    }

    async fn status_failure(server: &MockServer, status: u16) -> ItemFailure {
        let url = serve(server, &format!("/status/{}", status), ResponseTemplate::new(status)).await;
        let response = assert_ok!(reqwest::get(url).await);
        assert_err!(response.error_for_status()).into()
    }

    // ==================== io::Error to ItemFailure Conversion ====================

    #[test]
    fn test_connection_errors_are_network() {
        for kind in [
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::TimedOut,
            io::ErrorKind::BrokenPipe,
        ] {
            let failure: ItemFailure = io::Error::new(kind, "socket").into();
            assert_eq!(failure.kind, ErrorKind::Network, "{:?}", kind);
            assert!(failure.is_retryable());
        }
    }

    #[test]
    fn test_local_io_errors_are_not_retried() {
        let failure: ItemFailure = io::Error::new(io::ErrorKind::NotFound, "no such file").into();
        assert_eq!(failure.kind, ErrorKind::Config);
        assert!(!failure.is_retryable());

        let failure: ItemFailure = io::Error::new(io::ErrorKind::InvalidData, "bad utf-8").into();
        assert_eq!(failure.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_json_errors_are_validation() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let failure: ItemFailure = err.into();
        assert_eq!(failure.kind, ErrorKind::Validation);
        assert!(failure.message.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_batch_errors_keep_their_kind() {
        let failure: ItemFailure = BatchError::config("no endpoint").into();
        assert_eq!(failure, ItemFailure::config("no endpoint"));

        let failure: ItemFailure = BatchError::internal("oops").into();
        assert_eq!(failure.kind, ErrorKind::Unknown);
    }

    // ==================== reqwest::Error to ItemFailure Conversion ====================

    #[tokio::test]
    async fn test_http_status_errors_by_class() {
        let server = MockServer::start().await;

        let failure = status_failure(&server, 429).await;
        assert_eq!(failure.kind, ErrorKind::RateLimit);
        assert!(failure.is_retryable());

        for status in [500, 503] {
            assert_eq!(status_failure(&server, status).await.kind, ErrorKind::Service);
        }

        for status in [400, 404, 422] {
            let failure = status_failure(&server, status).await;
            assert_eq!(failure.kind, ErrorKind::Validation, "{}", status);
            assert!(!failure.is_retryable());
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_network() {
        let listener = assert_ok!(std::net::TcpListener::bind("127.0.0.1:0"));
        let port = assert_ok!(listener.local_addr()).port();
        drop(listener);

        let err = assert_err!(reqwest::get(format!("http://127.0.0.1:{}/", port)).await);
        assert!(err.is_connect());
        let failure: ItemFailure = err.into();
        assert_eq!(failure.kind, ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_client_timeout_is_network() {
        let server = MockServer::start().await;
        let url = serve(
            &server,
            "/slow",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .await;
        let client = assert_ok!(
            reqwest::Client::builder()
                .timeout(Duration::from_millis(50))
                .build()
        );

        let err = assert_err!(client.get(url).send().await);
        assert!(err.is_timeout());
        let failure: ItemFailure = err.into();
        assert_eq!(failure.kind, ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_validation() {
        let server = MockServer::start().await;
        let url = serve(
            &server,
            "/review",
            ResponseTemplate::new(200).set_body_string("score: eight"),
        )
        .await;

        let response = assert_ok!(reqwest::get(url).await);
        let err = assert_err!(response.json::<serde_json::Value>().await);
        let failure: ItemFailure = err.into();
        assert_eq!(failure.kind, ErrorKind::Validation);
    }

    // ==================== Retry Table ====================

    #[test]
    fn test_retry_eligibility_by_kind() {
        let policy = RetryPolicy::default();
        let retryable = [ErrorKind::Network, ErrorKind::Service, ErrorKind::RateLimit, ErrorKind::Unknown];
        for kind in ErrorKind::ALL {
            assert_eq!(
                policy.should_retry(kind, 0),
                retryable.contains(&kind),
                "{}",
                kind
            );
            assert!(!policy.should_retry(kind, policy.max_retries()));
        }
    }

    #[test]
    fn test_failure_display_and_json() {
        let failure = ItemFailure::rate_limit("slow down");
        assert_eq!(failure.to_string(), "[RATE_LIMIT] slow down");

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "RATE_LIMIT");
        assert_eq!(json["message"], "slow down");
    }

    #[test]
    fn test_user_errors() {
        assert!(BatchError::validation("dup").is_user_error());
        assert!(!BatchError::cancelled("stop").is_user_error());
    }
}

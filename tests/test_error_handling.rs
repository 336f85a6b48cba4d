// Unit tests for error classification and terminal mapping

use carbon_relay::RelayError;

#[test]
fn test_transport_errors_retryable() {
    let error = RelayError::Transport("connection refused".to_string());
    assert!(error.should_retry(), "Transport errors should be retried");

    let error = RelayError::Transport("operation timed out".to_string());
    assert!(error.should_retry(), "Timeouts should be retried");
}

#[test]
fn test_4xx_errors_retryable() {
    // The relay retries upstream 4xx responses. Unusual for client errors,
    // but it is the contract callers rely on; these assertions pin it.
    let error = RelayError::upstream_client_error(400, "Bad Request");
    assert!(error.should_retry(), "400 responses are retried");

    let error = RelayError::upstream_client_error(404, "Not Found");
    assert!(error.should_retry(), "404 responses are retried");

    let error = RelayError::upstream_client_error(422, "Unprocessable");
    assert!(error.should_retry(), "422 responses are retried");
}

#[test]
fn test_5xx_errors_retryable() {
    let error = RelayError::upstream_server_error(503, "Service Unavailable");
    assert!(error.should_retry(), "503 responses are retried");

    let error = RelayError::upstream_server_error(500, "Internal Server Error");
    assert!(error.should_retry(), "500 responses are retried");
}

#[test]
fn test_validation_errors_not_retryable() {
    let error = RelayError::Validation("count out of bounds".to_string());
    assert!(!error.should_retry(), "Validation failures are terminal");
}

#[test]
fn test_config_errors_not_retryable() {
    let error = RelayError::Config("service_url must not be empty".to_string());
    assert!(!error.should_retry(), "Config errors are terminal");
}

#[test]
fn test_terminal_errors_not_retryable() {
    let error = RelayError::ServiceUnavailable("down".to_string());
    assert!(!error.should_retry());

    let error = RelayError::Service("unexpected".to_string());
    assert!(!error.should_retry());
}

#[test]
fn test_terminal_mapping_transport() {
    let terminal = RelayError::Transport("connection refused".to_string()).into_terminal();
    assert!(matches!(terminal, RelayError::ServiceUnavailable(_)));
}

#[test]
fn test_terminal_mapping_persistent_4xx() {
    let terminal = RelayError::upstream_client_error(400, "count is required").into_terminal();
    match terminal {
        RelayError::Validation(message) => {
            assert!(message.contains("400"));
            assert!(message.contains("count is required"));
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
}

#[test]
fn test_terminal_mapping_persistent_503() {
    let terminal = RelayError::upstream_server_error(503, "overloaded").into_terminal();
    assert!(matches!(terminal, RelayError::ServiceUnavailable(_)));
}

#[test]
fn test_terminal_mapping_other_5xx() {
    let terminal = RelayError::upstream_server_error(500, "boom").into_terminal();
    assert!(matches!(terminal, RelayError::Service(_)));
}

#[test]
fn test_terminal_mapping_preserves_terminal_variants() {
    let terminal = RelayError::Validation("bad input".to_string()).into_terminal();
    assert!(matches!(terminal, RelayError::Validation(_)));
}

#[test]
fn test_http_status_mapping() {
    assert_eq!(RelayError::Validation("x".to_string()).to_http_status(), 400);
    assert_eq!(
        RelayError::ServiceUnavailable("x".to_string()).to_http_status(),
        503
    );
    assert_eq!(RelayError::Service("x".to_string()).to_http_status(), 500);
    assert_eq!(RelayError::Config("x".to_string()).to_http_status(), 500);
    assert_eq!(
        RelayError::upstream_client_error(404, "x").to_http_status(),
        404
    );
    assert_eq!(
        RelayError::upstream_server_error(500, "x").to_http_status(),
        502
    );
}

#[test]
fn test_from_upstream_status_categorization() {
    assert!(matches!(
        RelayError::from_upstream_status(404, "x"),
        RelayError::UpstreamClientError { status: 404, .. }
    ));
    assert!(matches!(
        RelayError::from_upstream_status(503, "x"),
        RelayError::UpstreamServerError { status: 503, .. }
    ));
    assert!(matches!(
        RelayError::from_upstream_status(302, "x"),
        RelayError::Service(_)
    ));
}

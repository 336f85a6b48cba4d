// Property: calculation input bounds.
//
// For any count in [0, 10_000_000] the pipeline returns a result echoing
// the input count. For any count outside the bounds the pipeline fails
// with a validation error before any remote call is issued.

use carbon_relay::{
    CarbonClient, RelayConfig, RelayError, RelayMetrics, ResultCache, RetryPolicy,
    MAX_MESSAGE_COUNT,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(uri: &str) -> CarbonClient {
    let mut config = RelayConfig::default();
    config.service_url = uri.to_string();
    CarbonClient::new(
        &config,
        Arc::new(ResultCache::new()),
        Arc::new(RelayMetrics::new()),
    )
    .unwrap()
    .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(10), 2.0))
}

fn out_of_bounds_count() -> impl Strategy<Value = i64> {
    prop_oneof![
        i64::MIN..0,
        (MAX_MESSAGE_COUNT as i64 + 1)..(MAX_MESSAGE_COUNT as i64 * 2),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Valid counts round-trip: the result's count field equals the input
    #[test]
    fn prop_valid_count_echoed(count in 0i64..=(MAX_MESSAGE_COUNT as i64)) {
        let rt = Runtime::new().unwrap();

        let result: Result<(), TestCaseError> = rt.block_on(async {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/calculate/discord"))
                .respond_with(move |req: &wiremock::Request| {
                    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                    let echoed = body["count"].as_u64().unwrap();
                    ResponseTemplate::new(200).set_body_json(json!({
                        "activity": "discord_message",
                        "count": echoed,
                        "carbon": {"grams": 2.0, "kilograms": 0.002},
                        "equivalents": {"carMiles": 0.005, "treeDays": 0.004},
                        "timestamp": "2025-06-01T12:00:00Z",
                        "calculationModel": "swd"
                    }))
                })
                .expect(1)
                .mount(&mock_server)
                .await;

            let client = client_for(&mock_server.uri());
            let result = client.calculate(count).await;

            prop_assert!(result.is_ok(), "Valid count {} rejected: {:?}", count, result.err());
            prop_assert_eq!(result.unwrap().count, count as u64);
            Ok(())
        });

        result?;
    }

    /// Out-of-bounds counts fail validation and never reach the wire
    #[test]
    fn prop_invalid_count_rejected_without_remote_call(count in out_of_bounds_count()) {
        let rt = Runtime::new().unwrap();

        let result: Result<(), TestCaseError> = rt.block_on(async {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/calculate/discord"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&mock_server)
                .await;

            let client = client_for(&mock_server.uri());
            let result = client.calculate(count).await;

            prop_assert!(
                matches!(result, Err(RelayError::Validation(_))),
                "Count {} should fail validation, got {:?}",
                count,
                result
            );
            Ok(())
        });

        result?;
    }
}

//! Remote calculation client for the CO2 microservice
//!
//! Turns a message count into an enriched, cached calculation result.
//! Input bounds are checked before any cache lookup or network I/O; cache
//! misses go to the microservice through a retry loop with exponential
//! backoff, and successful raw results are enriched before they are cached
//! and returned.

use crate::cache::ResultCache;
use crate::config::RelayConfig;
use crate::enricher;
use crate::error::{RelayError, Result};
use crate::metrics::RelayMetrics;
use crate::models::{CalculationResult, RawCalculation};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upper bound on message counts accepted for calculation
pub const MAX_MESSAGE_COUNT: u64 = 10_000_000;

/// Source tag sent with every microservice call
const REQUEST_SOURCE: &str = "carbon-relay";

/// Request body for the calculation endpoint
#[derive(Debug, Clone, Copy, Serialize)]
struct CalculationRequest {
    count: u64,
}

/// Retry schedule for remote calculation calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: usize,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Factor applied to the delay between consecutive retries
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Create a policy with an exponential backoff schedule
    pub fn new(max_attempts: usize, base_delay: Duration, multiplier: f64) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// Build the policy described by the relay configuration
    pub fn from_config(config: &RelayConfig) -> Self {
        RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            config.backoff_multiplier,
        )
    }

    /// Check whether another attempt should follow `attempts_made` failures
    pub fn should_retry(&self, attempts_made: usize, error: &RelayError) -> bool {
        attempts_made < self.max_attempts && error.should_retry()
    }

    /// Backoff to wait after the given 1-based failed attempt
    pub fn backoff_duration(&self, attempts_made: usize) -> Duration {
        let exponent = attempts_made.saturating_sub(1) as i32;
        let ms = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(ms as u64)
    }
}

/// Client for the downstream carbon-calculation microservice
pub struct CarbonClient {
    http_client: Client,
    calculate_url: String,
    /// Standard header set, built once at construction. The request
    /// identifier is generated here and therefore shared by every call
    /// this process instance makes, retries included.
    headers: HeaderMap,
    retry_policy: RetryPolicy,
    cache: Arc<ResultCache>,
    metrics: Arc<RelayMetrics>,
}

impl CarbonClient {
    /// Create a client from the relay configuration
    pub fn new(
        config: &RelayConfig,
        cache: Arc<ResultCache>,
        metrics: Arc<RelayMetrics>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let client = CarbonClient {
            http_client,
            calculate_url: format!(
                "{}/calculate/discord",
                config.service_url.trim_end_matches('/')
            ),
            headers: Self::standard_headers(),
            retry_policy: RetryPolicy::from_config(config),
            cache,
            metrics,
        };

        info!(
            "Carbon client initialized. Microservice URL: {}, Timeout: {}s",
            config.service_url, config.timeout_seconds
        );
        Ok(client)
    }

    /// Replace the retry schedule
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn standard_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("X-Request-Source", HeaderValue::from_static(REQUEST_SOURCE));
        if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            headers.insert("X-Request-ID", value);
        }
        headers
    }

    /// Calculate the carbon impact of a message count.
    ///
    /// Validation happens before any cache lookup or remote call. On a
    /// cache miss the microservice is called with retry and the enriched
    /// result is stored; on a hit the stored result is returned without
    /// touching the network.
    ///
    /// # Errors
    /// * `Validation` for out-of-bounds input or a persistent upstream 4xx
    /// * `ServiceUnavailable` when the microservice is unreachable, times
    ///   out, or keeps answering 503 after all attempts
    /// * `Service` for any other remote failure
    pub async fn calculate(&self, count: i64) -> Result<CalculationResult> {
        let count = self.validate_input(count)?;

        debug!("Calculating carbon for {} Discord messages", count);
        self.metrics.record_calculation();

        let computed = self
            .cache
            .get_or_compute(count, || self.fetch_with_retry(count))
            .await?;

        // An absent upstream body is never cached and cannot be enriched
        // into a usable result.
        computed.ok_or_else(|| {
            RelayError::Service("CO2 microservice returned an empty calculation".to_string())
        })
    }

    fn validate_input(&self, count: i64) -> Result<u64> {
        if count < 0 {
            self.metrics.record_validation_failure();
            return Err(RelayError::Validation(format!(
                "Message count cannot be negative: {}",
                count
            )));
        }
        let count = count as u64;
        if count > MAX_MESSAGE_COUNT {
            self.metrics.record_validation_failure();
            return Err(RelayError::Validation(format!(
                "Message count {} exceeds reasonable limit",
                count
            )));
        }
        Ok(count)
    }

    /// Call the microservice, retrying per policy, and enrich the result.
    async fn fetch_with_retry(&self, count: u64) -> Result<Option<CalculationResult>> {
        let mut attempts_made = 0;

        loop {
            attempts_made += 1;
            self.metrics.record_remote_attempt();
            let started = Instant::now();

            match self.try_fetch(count).await {
                Ok(raw) => {
                    let elapsed = started.elapsed();
                    info!(
                        "Carbon calculation completed in {}ms for {} messages",
                        elapsed.as_millis(),
                        count
                    );
                    return Ok(enricher::enrich(raw, elapsed));
                }
                Err(e) => {
                    if !self.retry_policy.should_retry(attempts_made, &e) {
                        self.metrics.record_remote_failure();
                        warn!(
                            "Calculation failed for {} messages after {} attempts: {}",
                            count, attempts_made, e
                        );
                        return Err(e.into_terminal());
                    }

                    let backoff = self.retry_policy.backoff_duration(attempts_made);
                    warn!(
                        "Calculation call failed (attempt {}), retrying after {:?}: {}",
                        attempts_made, backoff, e
                    );
                    self.metrics.record_remote_retry();
                    sleep(backoff).await;
                }
            }
        }
    }

    /// Single attempt against the calculation endpoint, no retry.
    async fn try_fetch(&self, count: u64) -> Result<Option<RawCalculation>> {
        debug!("Calling CO2 microservice: {}", self.calculate_url);

        let response = self
            .http_client
            .post(&self.calculate_url)
            .headers(self.headers.clone())
            .json(&CalculationRequest { count })
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Calculation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            debug!(
                "Microservice returned status {} for count={}: {}",
                status, count, detail
            );
            return Err(RelayError::from_upstream_status(status.as_u16(), detail));
        }

        response.json::<Option<RawCalculation>>().await.map_err(|e| {
            // A timeout can also strike mid-body; it stays retry-eligible
            if e.is_timeout() {
                RelayError::Transport(format!("Calculation request failed: {}", e))
            } else {
                RelayError::Service(format!("Failed to decode calculation response: {}", e))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(policy: RetryPolicy) -> CarbonClient {
        let config = RelayConfig::default();
        CarbonClient::new(
            &config,
            Arc::new(ResultCache::new()),
            Arc::new(RelayMetrics::new()),
        )
        .unwrap()
        .with_retry_policy(policy)
    }

    #[test]
    fn test_retry_policy_backoff_schedule() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), 2.0);
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_duration(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_retry_policy_attempt_ceiling() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), 2.0);
        let error = RelayError::Transport("connection refused".to_string());

        assert!(policy.should_retry(1, &error));
        assert!(policy.should_retry(2, &error));
        assert!(!policy.should_retry(3, &error));
    }

    #[test]
    fn test_retry_policy_respects_error_eligibility() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), 2.0);
        let error = RelayError::Validation("bad input".to_string());
        assert!(!policy.should_retry(1, &error));
    }

    #[tokio::test]
    async fn test_negative_count_rejected() {
        let client = test_client(RetryPolicy::new(3, Duration::from_millis(1), 2.0));
        let result = client.calculate(-5).await;
        assert!(matches!(result, Err(RelayError::Validation(_))));
    }

    #[tokio::test]
    async fn test_oversized_count_rejected() {
        let client = test_client(RetryPolicy::new(3, Duration::from_millis(1), 2.0));
        let result = client.calculate(MAX_MESSAGE_COUNT as i64 + 1).await;
        assert!(matches!(result, Err(RelayError::Validation(_))));
    }

    #[test]
    fn test_calculate_url_construction() {
        let client = test_client(RetryPolicy::new(3, Duration::from_millis(1), 2.0));
        assert_eq!(
            client.calculate_url,
            "http://localhost:3002/api/v1/calculate/discord"
        );
    }

    #[test]
    fn test_standard_headers_present() {
        let headers = CarbonClient::standard_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get("X-Request-Source").unwrap(), REQUEST_SOURCE);
        assert!(headers.get("X-Request-ID").is_some());
    }
}

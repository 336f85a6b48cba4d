//! Health probing for the CO2 microservice
//!
//! A one-shot liveness check against the downstream `/health` endpoint.
//! The probe never fails: every failure path collapses into a `Down`
//! report stamped with the current time.

use crate::error::{RelayError, Result};
use crate::models::{HealthReport, HealthStatus};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Downstream service name carried in every report
const SERVICE_NAME: &str = "co2-microservice";

/// Body the microservice health endpoint answers with
#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: Option<String>,
}

/// One-shot health prober for the CO2 microservice
pub struct HealthProber {
    client: Client,
    health_url: String,
}

impl HealthProber {
    /// Create a prober for the given microservice base URL.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the microservice, e.g. `http://localhost:3002/api/v1`
    /// * `timeout` - Bound on the whole probe round trip
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HealthProber {
            client,
            health_url: format!("{}/health", base_url.trim_end_matches('/')),
        })
    }

    /// Probe the microservice once and map the outcome to a tri-state report.
    ///
    /// A 2xx response whose body reports `"operational"` maps to
    /// `Operational`; any other 2xx content maps to `Degraded`; a non-2xx
    /// status, timeout, connection failure, or unreadable body maps to
    /// `Down`. Never returns an error.
    pub async fn check_health(&self) -> HealthReport {
        debug!("Probing microservice health at {}", self.health_url);

        let response = match self.client.get(&self.health_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Health check failed for CO2 microservice: {}", e);
                return HealthReport::now(HealthStatus::Down, SERVICE_NAME);
            }
        };

        if !response.status().is_success() {
            warn!(
                "Health check returned non-success status: {}",
                response.status()
            );
            return HealthReport::now(HealthStatus::Down, SERVICE_NAME);
        }

        // Any 2xx content other than an "operational" report is degraded,
        // including bodies that do not parse at all.
        let status = match response.json::<HealthBody>().await {
            Ok(body) if body.status.as_deref() == Some("operational") => HealthStatus::Operational,
            Ok(_) => HealthStatus::Degraded,
            Err(e) => {
                warn!("Health check body was unreadable: {}", e);
                HealthStatus::Degraded
            }
        };

        HealthReport::now(status, SERVICE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prober_creation() {
        let prober = HealthProber::new("http://localhost:3002/api/v1", Duration::from_secs(5));
        assert!(prober.is_ok());
    }

    #[test]
    fn test_health_url_handles_trailing_slash() {
        let prober =
            HealthProber::new("http://localhost:3002/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(prober.health_url, "http://localhost:3002/api/v1/health");
    }
}

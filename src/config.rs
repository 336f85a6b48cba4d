//! Configuration management for the carbon relay

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the relay process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the CO2 microservice (default: http://localhost:3002/api/v1)
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Client-side timeout for remote calls in seconds (default: 5)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Total attempts per calculation, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// First backoff delay in milliseconds (default: 1000)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Multiplier applied to the backoff delay between attempts (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Address the relay HTTP server binds to (default: 127.0.0.1:8080)
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Path of the durable real-traffic counter file (default: carbon-data.txt)
    #[serde(default = "default_counter_file")]
    pub counter_file: String,
}

// Default value functions for serde
fn default_service_url() -> String {
    "http://localhost:3002/api/v1".to_string()
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_max_attempts() -> usize {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_listen_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_counter_file() -> String {
    "carbon-data.txt".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            service_url: default_service_url(),
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            listen_address: default_listen_address(),
            counter_file: default_counter_file(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    /// * `Ok(RelayConfig)` if loading and validation succeed
    /// * `Err(RelayError)` if the file cannot be read or the config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;

        let config: RelayConfig = serde_yaml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - service_url must not be empty
    /// - timeout_seconds must be > 0
    /// - max_attempts must be > 0
    /// - backoff_multiplier must be >= 1.0
    /// - listen_address must not be empty
    /// - counter_file must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            return Err(RelayError::Config(
                "service_url must not be empty".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(RelayError::Config(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(RelayError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.backoff_multiplier < 1.0 {
            return Err(RelayError::Config(format!(
                "backoff_multiplier must be at least 1.0, got {}",
                self.backoff_multiplier
            )));
        }

        if self.listen_address.is_empty() {
            return Err(RelayError::Config(
                "listen_address must not be empty".to_string(),
            ));
        }

        if self.counter_file.is_empty() {
            return Err(RelayError::Config(
                "counter_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

//! Error types for the carbon relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Error types that can occur while fronting the CO2 microservice
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream returned client error: {status} - {detail}")]
    UpstreamClientError { status: u16, detail: String },

    #[error("Upstream returned server error: {status} - {detail}")]
    UpstreamServerError { status: u16, detail: String },
}

impl RelayError {
    /// Determine if this error should trigger another attempt at the
    /// CO2 microservice.
    ///
    /// Returns true for:
    /// - Transport failures (connection refused, timeout)
    /// - Upstream 4xx responses (yes, even these; tests pin the behavior)
    /// - Upstream 5xx responses
    ///
    /// Returns false for everything detected before the remote call
    /// (validation, configuration) and for errors that already carry a
    /// terminal classification.
    pub fn should_retry(&self) -> bool {
        match self {
            RelayError::Transport(_) => true,
            RelayError::UpstreamClientError { .. } => true,
            RelayError::UpstreamServerError { .. } => true,

            RelayError::Validation(_) => false,
            RelayError::Config(_) => false,
            RelayError::ServiceUnavailable(_) => false,
            RelayError::Service(_) => false,
        }
    }

    /// Convert error to an HTTP status code for the route layer
    pub fn to_http_status(&self) -> u16 {
        match self {
            RelayError::Validation(_) => 400,
            RelayError::ServiceUnavailable(_) => 503,
            RelayError::Service(_) => 500,
            RelayError::Config(_) => 500,
            RelayError::Transport(_) => 503,

            // Pass through the upstream 4xx status
            RelayError::UpstreamClientError { status, .. } => *status,
            RelayError::UpstreamServerError { .. } => 502,
        }
    }

    /// Translate a retry-phase error into the terminal taxonomy surfaced
    /// to callers once all attempts are exhausted.
    ///
    /// - Transport failures become `ServiceUnavailable`
    /// - Persistent 4xx becomes `Validation` carrying the upstream detail
    /// - Persistent 503 becomes `ServiceUnavailable`
    /// - Any other upstream failure becomes a generic `Service` error
    pub fn into_terminal(self) -> Self {
        match self {
            RelayError::Transport(_) => RelayError::ServiceUnavailable(
                "CO2 microservice unavailable. Please try again later.".to_string(),
            ),
            RelayError::UpstreamClientError { status, detail } => {
                RelayError::Validation(format!("Invalid request ({}): {}", status, detail))
            }
            RelayError::UpstreamServerError { status: 503, .. } => RelayError::ServiceUnavailable(
                "CO2 microservice unavailable. Please try again later.".to_string(),
            ),
            RelayError::UpstreamServerError { .. } => RelayError::Service(
                "Failed to calculate carbon impact. Please contact support.".to_string(),
            ),
            other => other,
        }
    }

    /// Create an UpstreamClientError from a status code and detail
    pub fn upstream_client_error(status: u16, detail: impl Into<String>) -> Self {
        RelayError::UpstreamClientError {
            status,
            detail: detail.into(),
        }
    }

    /// Create an UpstreamServerError from a status code and detail
    pub fn upstream_server_error(status: u16, detail: impl Into<String>) -> Self {
        RelayError::UpstreamServerError {
            status,
            detail: detail.into(),
        }
    }

    /// Create an error from an upstream HTTP status code
    ///
    /// Automatically categorizes as 4xx or 5xx error
    pub fn from_upstream_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if (400..500).contains(&status) {
            RelayError::upstream_client_error(status, detail)
        } else if (500..600).contains(&status) {
            RelayError::upstream_server_error(status, detail)
        } else {
            RelayError::Service(format!("Unexpected upstream status {}: {}", status, detail))
        }
    }
}

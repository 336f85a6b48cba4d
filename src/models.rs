//! Core data models for the carbon relay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Carbon mass for a calculation, in both unit scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonMetrics {
    /// Emitted CO2 in grams
    pub grams: f64,
    /// Emitted CO2 in kilograms
    pub kilograms: f64,
}

/// Physical-world equivalents of an emission figure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalEquivalents {
    /// Miles driven in an average gasoline car
    pub car_miles: f64,
    /// Days of absorption by a mature tree
    pub tree_days: f64,
}

/// Calculation result as returned by the CO2 microservice, before enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculation {
    /// Activity kind, e.g. "discord_message"
    pub activity: String,
    /// Message count the calculation covers
    pub count: u64,
    /// Carbon mass emitted
    pub carbon: CarbonMetrics,
    /// Physical equivalents of the emission
    pub equivalents: PhysicalEquivalents,
    /// When the microservice produced the figure
    pub timestamp: DateTime<Utc>,
    /// Emission model identifier, e.g. "swd"
    pub calculation_model: String,
    /// Free-text caveat attached by the microservice
    #[serde(default)]
    pub note: Option<String>,
}

/// Enriched calculation result returned to relay callers
///
/// Identical to [`RawCalculation`] plus the two observability fields the
/// enricher fills in. The microservice never sets these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub activity: String,
    pub count: u64,
    pub carbon: CarbonMetrics,
    pub equivalents: PhysicalEquivalents,
    pub timestamp: DateTime<Utc>,
    pub calculation_model: String,
    #[serde(default)]
    pub note: Option<String>,
    /// Measured wall-clock duration of the remote call, in milliseconds
    pub processing_time_ms: u64,
    /// Unique token for observability correlation
    pub trace_id: String,
}

/// Health signal for the downstream microservice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// Service reachable and reporting itself operational
    Operational,
    /// Service reachable but reporting something else
    Degraded,
    /// Service unreachable, timing out, or answering non-2xx
    Down,
}

impl HealthStatus {
    /// Convert health status to string
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Operational => "OPERATIONAL",
            HealthStatus::Degraded => "DEGRADED",
            HealthStatus::Down => "DOWN",
        }
    }
}

/// Result of a single health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub service: String,
}

impl HealthReport {
    /// Create a report stamped with the current time
    pub fn now(status: HealthStatus, service: impl Into<String>) -> Self {
        HealthReport {
            status,
            checked_at: Utc::now(),
            service: service.into(),
        }
    }
}

/// Point-in-time read of both traffic counters
///
/// The two fields are read independently; under concurrent writers the pair
/// is not guaranteed to correspond to any single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Messages from genuine bot activity
    pub real: u64,
    /// Messages from non-production simulation
    pub simulated: u64,
}

impl CounterSnapshot {
    /// Sum of both counters at read time
    pub fn combined(&self) -> u64 {
        self.real + self.simulated
    }
}

//! Carbon Relay
//!
//! A resilient front for an external carbon-calculation microservice. The
//! relay turns raw Discord message counts into enriched carbon-impact
//! results and tracks live versus simulated traffic across the lifetime of
//! the process.
//!
//! # Overview
//!
//! A caller supplies a message count. The count is validated, the result
//! cache is consulted, and on a miss the CO2 microservice is called with
//! timeout, retry, and exponential backoff. Successful raw results are
//! enriched with processing-time and trace metadata, cached, and returned.
//! Independently, batch-recording calls mutate the shared traffic counters,
//! durably persist the real-traffic total, and re-enter the pipeline to
//! report combined impact.
//!
//! # Architecture
//!
//! - [`CarbonClient`]: validation, retry loop, and terminal error mapping
//! - [`ResultCache`]: process-lifetime memoization keyed by message count
//! - [`CounterStore`]: atomic real/simulated counters with snapshots
//! - [`CounterPersistence`]: best-effort single-file durability
//! - [`enricher`]: pure enrichment of raw microservice results
//! - [`HealthProber`]: tri-state downstream liveness probe, never fails
//! - [`RelayMetrics`]: runtime counters with Prometheus text rendering
//! - [`RelayServer`]: thin HTTP route layer over the above
//!
//! # Configuration
//!
//! Configuration is loaded from a YAML file:
//!
//! ```yaml
//! service_url: "http://localhost:3002/api/v1"
//! timeout_seconds: 5
//! max_attempts: 3
//! backoff_base_ms: 1000
//! backoff_multiplier: 2.0
//! listen_address: "127.0.0.1:8080"
//! counter_file: "carbon-data.txt"
//! ```
//!
//! See [`RelayConfig`] for the defaults applied to omitted fields.
//!
//! # Error Handling
//!
//! All fallible operations use [`RelayError`]. Validation failures are
//! detected before any I/O; remote failures are retried per policy and then
//! translated into the caller-facing taxonomy (`Validation`,
//! `ServiceUnavailable`, `Service`). Counter persistence failures and
//! health-probe failures are never surfaced as errors.

pub mod cache;
pub mod client;
pub mod config;
pub mod counter;
pub mod enricher;
pub mod error;
pub mod health;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod routes;

// Re-export commonly used types
pub use cache::{CacheStats, ResultCache};
pub use client::{CarbonClient, RetryPolicy, MAX_MESSAGE_COUNT};
pub use config::RelayConfig;
pub use counter::CounterStore;
pub use error::{RelayError, Result};
pub use health::HealthProber;
pub use metrics::{MetricsSnapshot, RelayMetrics};
pub use models::{
    CalculationResult, CarbonMetrics, CounterSnapshot, HealthReport, HealthStatus,
    PhysicalEquivalents, RawCalculation,
};
pub use persistence::CounterPersistence;
pub use routes::{RelayServer, RelayState};

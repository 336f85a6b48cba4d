//! Runtime metrics for the carbon relay
//!
//! Thread-safe counters collected with atomic operations and rendered as
//! Prometheus text by the route layer.

use crate::cache::CacheStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the relay
///
/// All operations are thread-safe using atomic operations.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    // Pipeline statistics
    calculations_total: AtomicU64,
    validation_failures: AtomicU64,

    // Remote call statistics
    remote_attempts: AtomicU64,
    remote_retries: AtomicU64,
    remote_failures: AtomicU64,

    // Traffic recording statistics
    real_batches: AtomicU64,
    simulated_batches: AtomicU64,
    simulation_resets: AtomicU64,

    // Health probe statistics
    health_probes: AtomicU64,
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub calculations_total: u64,
    pub validation_failures: u64,
    pub remote_attempts: u64,
    pub remote_retries: u64,
    pub remote_failures: u64,
    pub real_batches: u64,
    pub simulated_batches: u64,
    pub simulation_resets: u64,
    pub health_probes: u64,
}

impl RelayMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a calculation request entering the pipeline
    pub fn record_calculation(&self) {
        self.calculations_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request rejected before any I/O
    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one HTTP attempt against the microservice
    pub fn record_remote_attempt(&self) {
        self.remote_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a retry of a failed remote attempt
    pub fn record_remote_retry(&self) {
        self.remote_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a remote call that failed after all attempts
    pub fn record_remote_failure(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a recorded traffic batch
    pub fn record_batch(&self, simulated: bool) {
        if simulated {
            self.simulated_batches.fetch_add(1, Ordering::Relaxed);
        } else {
            self.real_batches.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a simulation counter reset
    pub fn record_simulation_reset(&self) {
        self.simulation_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a health probe issued downstream
    pub fn record_health_probe(&self) {
        self.health_probes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a consistent-enough snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calculations_total: self.calculations_total.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            remote_attempts: self.remote_attempts.load(Ordering::Relaxed),
            remote_retries: self.remote_retries.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            real_batches: self.real_batches.load(Ordering::Relaxed),
            simulated_batches: self.simulated_batches.load(Ordering::Relaxed),
            simulation_resets: self.simulation_resets.load(Ordering::Relaxed),
            health_probes: self.health_probes.load(Ordering::Relaxed),
        }
    }
}

/// Render metrics in Prometheus text exposition format
pub fn render_prometheus(snapshot: &MetricsSnapshot, cache: &CacheStats) -> String {
    let mut output = String::new();

    output.push_str("# HELP carbon_relay_calculations_total Calculation requests entering the pipeline\n");
    output.push_str("# TYPE carbon_relay_calculations_total counter\n");
    output.push_str(&format!(
        "carbon_relay_calculations_total {}\n",
        snapshot.calculations_total
    ));

    output.push_str("# HELP carbon_relay_validation_failures_total Requests rejected before any I/O\n");
    output.push_str("# TYPE carbon_relay_validation_failures_total counter\n");
    output.push_str(&format!(
        "carbon_relay_validation_failures_total {}\n",
        snapshot.validation_failures
    ));

    output.push_str("# HELP carbon_relay_remote_attempts_total HTTP attempts against the CO2 microservice\n");
    output.push_str("# TYPE carbon_relay_remote_attempts_total counter\n");
    output.push_str(&format!(
        "carbon_relay_remote_attempts_total {}\n",
        snapshot.remote_attempts
    ));

    output.push_str("# HELP carbon_relay_remote_retries_total Retried remote attempts\n");
    output.push_str("# TYPE carbon_relay_remote_retries_total counter\n");
    output.push_str(&format!(
        "carbon_relay_remote_retries_total {}\n",
        snapshot.remote_retries
    ));

    output.push_str("# HELP carbon_relay_remote_failures_total Remote calls failed after all attempts\n");
    output.push_str("# TYPE carbon_relay_remote_failures_total counter\n");
    output.push_str(&format!(
        "carbon_relay_remote_failures_total {}\n",
        snapshot.remote_failures
    ));

    output.push_str("# HELP carbon_relay_cache_hits_total Result cache hits\n");
    output.push_str("# TYPE carbon_relay_cache_hits_total counter\n");
    output.push_str(&format!("carbon_relay_cache_hits_total {}\n", cache.hits));

    output.push_str("# HELP carbon_relay_cache_misses_total Result cache misses\n");
    output.push_str("# TYPE carbon_relay_cache_misses_total counter\n");
    output.push_str(&format!(
        "carbon_relay_cache_misses_total {}\n",
        cache.misses
    ));

    output.push_str("# HELP carbon_relay_cache_entries Result cache entries resident\n");
    output.push_str("# TYPE carbon_relay_cache_entries gauge\n");
    output.push_str(&format!("carbon_relay_cache_entries {}\n", cache.entries));

    output.push_str("# HELP carbon_relay_real_batches_total Real-traffic batches recorded\n");
    output.push_str("# TYPE carbon_relay_real_batches_total counter\n");
    output.push_str(&format!(
        "carbon_relay_real_batches_total {}\n",
        snapshot.real_batches
    ));

    output.push_str("# HELP carbon_relay_simulated_batches_total Simulated-traffic batches recorded\n");
    output.push_str("# TYPE carbon_relay_simulated_batches_total counter\n");
    output.push_str(&format!(
        "carbon_relay_simulated_batches_total {}\n",
        snapshot.simulated_batches
    ));

    output.push_str("# HELP carbon_relay_simulation_resets_total Simulation counter resets\n");
    output.push_str("# TYPE carbon_relay_simulation_resets_total counter\n");
    output.push_str(&format!(
        "carbon_relay_simulation_resets_total {}\n",
        snapshot.simulation_resets
    ));

    output.push_str("# HELP carbon_relay_health_probes_total Health probes issued downstream\n");
    output.push_str("# TYPE carbon_relay_health_probes_total counter\n");
    output.push_str(&format!(
        "carbon_relay_health_probes_total {}\n",
        snapshot.health_probes
    ));

    output
}

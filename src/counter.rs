//! Shared traffic counters
//!
//! Two independently growing counters track real bot traffic and simulated
//! traffic for the lifetime of the process. All mutation goes through atomic
//! fetch-and-add, so no update is lost within a counter; across the two
//! counters there is no combined atomicity.

use crate::models::CounterSnapshot;
use crate::persistence::CounterPersistence;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Process-wide message counters with best-effort durability for the real
/// counter.
///
/// Constructed once at startup and shared by handle; the real counter is
/// seeded from the persisted value.
#[derive(Debug)]
pub struct CounterStore {
    real: AtomicU64,
    simulated: AtomicU64,
    persistence: CounterPersistence,
}

impl CounterStore {
    /// Create a store seeded from the persisted real-traffic count.
    pub fn new(persistence: CounterPersistence) -> Self {
        let saved = persistence.load();
        CounterStore {
            real: AtomicU64::new(saved),
            simulated: AtomicU64::new(0),
            persistence,
        }
    }

    /// Add to the real-traffic counter and return the new total.
    ///
    /// The post-add total is persisted synchronously; a persistence failure
    /// is logged and discarded so it can never affect the caller or roll
    /// back the in-memory update.
    pub fn add_real(&self, delta: u64) -> u64 {
        let total = self.real.fetch_add(delta, Ordering::Relaxed) + delta;
        if let Err(e) = self.persistence.save(total) {
            warn!("Failed to persist real message count {}: {}", total, e);
        }
        total
    }

    /// Add to the simulated-traffic counter and return the new total.
    pub fn add_simulated(&self, delta: u64) -> u64 {
        self.simulated.fetch_add(delta, Ordering::Relaxed) + delta
    }

    /// Read both counters.
    ///
    /// The reads are independent; concurrent writers may land between them.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            real: self.real.load(Ordering::Relaxed),
            simulated: self.simulated.load(Ordering::Relaxed),
        }
    }

    /// Zero the simulated counter and return the value it held.
    pub fn reset_simulated(&self) -> u64 {
        self.simulated.swap(0, Ordering::Relaxed)
    }
}

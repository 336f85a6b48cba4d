//! Result cache for calculation memoization
//!
//! Calculation results are keyed by the raw message count for the lifetime
//! of the process. There is no expiry, no size bound, and no per-key mutual
//! exclusion: concurrent misses on the same key may each run the compute
//! function, and whichever write lands last wins.

use crate::error::Result;
use crate::models::CalculationResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Cache statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Process-wide memoization store for calculation results
#[derive(Debug, Default)]
pub struct ResultCache {
    storage: RwLock<HashMap<u64, CalculationResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached result for a message count
    pub fn get(&self, count: u64) -> Option<CalculationResult> {
        match self.storage.read() {
            Ok(storage) => storage.get(&count).cloned(),
            Err(e) => {
                warn!("Cache lookup error for count={}: {:?}", count, e);
                None
            }
        }
    }

    /// Store a result, replacing any entry already present for the count
    pub fn insert(&self, count: u64, result: CalculationResult) {
        match self.storage.write() {
            Ok(mut storage) => {
                storage.insert(count, result);
            }
            Err(e) => {
                // Log and continue; a lost cache write never fails the request
                warn!("Failed to cache result for count={}: {:?}", count, e);
            }
        }
    }

    /// Return the cached result for `count`, or run `compute` and store its
    /// output.
    ///
    /// The compute future runs without any cache lock held, so concurrent
    /// misses on the same key may each invoke it independently. A compute
    /// that yields `Ok(None)` or an error is never cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        count: u64,
        compute: F,
    ) -> Result<Option<CalculationResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<CalculationResult>>>,
    {
        if let Some(hit) = self.get(count) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for count={}", count);
            return Ok(Some(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss for count={}", count);

        let computed = compute().await?;
        if let Some(ref result) = computed {
            self.insert(count, result.clone());
        }
        Ok(computed)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = match self.storage.read() {
            Ok(storage) => storage.len(),
            Err(_) => 0,
        };
        CacheStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

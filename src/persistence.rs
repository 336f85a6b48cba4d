//! Durable storage for the real-traffic counter
//!
//! The store is a single plain-text integer, overwritten on every
//! real-traffic update and read once at process start. Persistence is
//! strictly best-effort: a failed load defaults to zero and a failed save
//! is logged and discarded by the caller, never surfaced to a request.

use crate::error::{RelayError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Single-value durable store for the real message counter
#[derive(Debug, Clone)]
pub struct CounterPersistence {
    path: PathBuf,
}

impl CounterPersistence {
    /// Create a store backed by the given file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CounterPersistence {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted counter value.
    ///
    /// Returns 0 if the file is absent, unreadable, or does not parse as an
    /// integer. Never fails the caller.
    pub fn load(&self) -> u64 {
        if !self.path.exists() {
            info!("Starting with fresh message count");
            return 0;
        }

        let parsed = fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|content| content.trim().parse::<u64>().map_err(|e| e.to_string()));

        match parsed {
            Ok(count) => {
                info!("Loaded previous message count: {}", count);
                count
            }
            Err(e) => {
                warn!("Could not load previous data: {}", e);
                0
            }
        }
    }

    /// Overwrite the persisted counter value.
    ///
    /// Callers log and discard the error; persistence never fails a request
    /// nor rolls back the in-memory counter that triggered it.
    pub fn save(&self, count: u64) -> Result<()> {
        fs::write(&self.path, count.to_string())
            .map_err(|e| RelayError::Service(format!("Failed to save message count: {}", e)))?;
        debug!("Saved message count: {}", count);
        Ok(())
    }
}

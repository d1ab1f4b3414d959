//! Aggregated-config caching.
//!
//! # Responsibilities
//! - Hold the single cached aggregate with its expiry instant
//! - Serve hits without any I/O
//! - Allow explicit invalidation on config reload
//!
//! # Design Decisions
//! - Explicit object with get/set/clear owned by the aggregator; no
//!   module-global state, so tests construct their own instance
//! - The lock is held only across the read or write, never across an
//!   await; racing requests on a miss may each repopulate the entry,
//!   which is benign since every writer computes equivalent data

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::discovery::aggregator::AggregatedConfig;

struct CacheEntry {
    data: Arc<AggregatedConfig>,
    expires_at: Instant,
}

/// Process-wide cache for the aggregated config document.
#[derive(Default)]
pub struct ConfigCache {
    entry: Mutex<Option<CacheEntry>>,
}

impl ConfigCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        self.entry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached aggregate if it has not expired at `now`.
    pub fn get(&self, now: Instant) -> Option<Arc<AggregatedConfig>> {
        self.lock()
            .as_ref()
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.data.clone())
    }

    /// Replace the cached aggregate.
    pub fn set(&self, data: Arc<AggregatedConfig>, expires_at: Instant) {
        *self.lock() = Some(CacheEntry { data, expires_at });
    }

    /// Drop the cached aggregate, forcing the next read to re-aggregate.
    pub fn clear(&self) {
        *self.lock() = None;
    }
}

//! Cache statistics

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub(crate) struct CacheStats {
    pub stores: AtomicU64,
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub expirations: AtomicU64,
    pub removals: AtomicU64,
    pub stats_since: DateTime<Utc>,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            stores: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            removals: AtomicU64::new(0),
            stats_since: Utc::now(),
        }
    }
}

impl CacheStats {
    pub fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entry_count: usize) -> CacheStatistics {
        CacheStatistics {
            stores: self.stores.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            entry_count,
            stats_since: self.stats_since,
        }
    }
}

/// Point-in-time view of cache activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub stores: u64,
    pub hits: u64,
    /// Lookups of tokens that were unknown
    pub misses: u64,
    /// Entries evicted because they outlived the TTL, by reads or sweeps
    pub expirations: u64,
    /// Entries released explicitly
    pub removals: u64,
    pub entry_count: usize,
    pub stats_since: DateTime<Utc>,
}

//! Cache configuration

use crawlgate_core::{DEFAULT_CACHE_TTL, DEFAULT_SWEEP_INTERVAL};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries older than this are no longer retrievable
    pub ttl: Duration,
    /// Period of the background sweep; `Duration::ZERO` disables it
    pub sweep_interval: Duration,
}

impl CacheConfig {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self { ttl, sweep_interval }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

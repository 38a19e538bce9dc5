//! The result cache

use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::errors::{CacheError, Result};
use crate::page::{paginate, PageView};
use crate::stats::{CacheStatistics, CacheStats};
use crate::token::ResultToken;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Token-addressed store of result sets with a fixed time-to-live.
///
/// Handles are cheap to clone and share one table. The background sweeper
/// is aborted when the last handle is dropped.
#[derive(Clone)]
pub struct ResultCache {
    pub(crate) inner: Arc<CacheInner>,
}

pub(crate) struct CacheInner {
    pub config: CacheConfig,
    pub entries: DashMap<ResultToken, CacheEntry>,
    pub stats: CacheStats,
    pub sweeper: RwLock<Option<JoinHandle<()>>>,
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.write().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("ttl", &self.inner.config.ttl)
            .field("sweep_interval", &self.inner.config.sweep_interval)
            .field("entry_count", &self.inner.entries.len())
            .finish()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResultCache {
    /// Create an empty cache. The sweeper is not running until
    /// [`start_sweeper`](Self::start_sweeper) is called.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                config,
                entries: DashMap::new(),
                stats: CacheStats::default(),
                sweeper: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Retain a full result set under a fresh token
    pub fn store(&self, records: Vec<Value>) -> ResultToken {
        let entry = CacheEntry::new(records);
        let token = entry.token();
        let total = entry.total();
        let created_at = entry.created_at();
        self.inner.entries.insert(token, entry);
        CacheStats::record(&self.inner.stats.stores);
        tracing::info!(%token, total, %created_at, "cached result set");
        token
    }

    /// Serve one page of a stored result set.
    ///
    /// An entry found past its TTL is evicted by this call and reported as
    /// [`CacheError::CacheExpired`].
    pub fn page(&self, token: &ResultToken, page: usize, page_size: usize) -> Result<PageView> {
        if page == 0 || page_size == 0 {
            return Err(CacheError::InvalidPage { page, page_size });
        }
        let ttl = self.inner.config.ttl;

        let view = {
            let Some(entry) = self.inner.entries.get(token) else {
                CacheStats::record(&self.inner.stats.misses);
                return Err(CacheError::CacheMiss { token: *token });
            };
            if entry.is_expired(ttl) {
                None
            } else {
                Some(paginate(entry.records(), page, page_size)?)
            }
        };

        match view {
            Some(view) => {
                CacheStats::record(&self.inner.stats.hits);
                Ok(view)
            }
            None => {
                // Re-check under the shard lock; a concurrent sweep may have won.
                if self
                    .inner
                    .entries
                    .remove_if(token, |_, entry| entry.is_expired(ttl))
                    .is_some()
                {
                    CacheStats::record(&self.inner.stats.expirations);
                    tracing::debug!(%token, "evicted expired result set on read");
                }
                Err(CacheError::CacheExpired { token: *token })
            }
        }
    }

    /// Delete every entry older than the TTL; returns how many were removed
    pub fn sweep(&self) -> usize {
        let ttl = self.inner.config.ttl;
        let mut removed = 0usize;
        self.inner.entries.retain(|_, entry| {
            let keep = !entry.is_expired(ttl);
            removed += usize::from(!keep);
            keep
        });
        if removed > 0 {
            CacheStats::add(&self.inner.stats.expirations, removed as u64);
            tracing::info!(removed, remaining = self.inner.entries.len(), "swept expired result sets");
        }
        removed
    }

    /// Release a result set before its TTL; `false` if the token was unknown
    pub fn remove(&self, token: &ResultToken) -> bool {
        let removed = self.inner.entries.remove(token).is_some();
        if removed {
            CacheStats::record(&self.inner.stats.removals);
        }
        removed
    }

    pub fn contains(&self, token: &ResultToken) -> bool {
        self.inner.entries.contains_key(token)
    }

    /// Number of entries held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.inner.stats.snapshot(self.inner.entries.len())
    }
}

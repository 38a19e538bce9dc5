//! Stored result sets

use crate::token::ResultToken;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// One stored result set. The payload is never mutated after creation.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub(crate) token: ResultToken,
    pub(crate) records: Vec<Value>,
    /// Wall-clock creation time, for display
    pub(crate) created_at: DateTime<Utc>,
    /// Monotonic creation time, used for expiry
    pub(crate) stored_at: Instant,
}

impl CacheEntry {
    pub(crate) fn new(records: Vec<Value>) -> Self {
        Self {
            token: ResultToken::generate(),
            records,
            created_at: Utc::now(),
            stored_at: Instant::now(),
        }
    }

    pub fn token(&self) -> ResultToken {
        self.token
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    /// Expiry is fixed from creation; reading an entry does not extend it
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

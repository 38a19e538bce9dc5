//! Cache lookup errors

use crate::token::ResultToken;

/// Why a page could not be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The token was never issued, was released, or was already swept
    #[error("no cached result for token {token}")]
    CacheMiss { token: ResultToken },

    /// The entry existed but outlived its TTL; it has been evicted
    #[error("cached result {token} has expired")]
    CacheExpired { token: ResultToken },

    #[error("invalid page request: page {page}, page size {page_size} (both must be at least 1)")]
    InvalidPage { page: usize, page_size: usize },
}

impl CacheError {
    /// Both miss and expiry mean "not found" to a caller
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::CacheMiss { .. } | CacheError::CacheExpired { .. })
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

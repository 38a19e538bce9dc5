//! Token-addressed cache for worker result sets
//!
//! A bulk query returns every row at once. The rows are stored here under a
//! fresh [`ResultToken`] and served back one page at a time until the entry
//! is older than the configured TTL. Expiry is measured from creation only;
//! reads never extend it.
//!
//! Expired entries are removed eagerly when read and periodically by a
//! background sweeper whose lifecycle belongs to the cache handle:
//! [`ResultCache::start_sweeper`], [`ResultCache::stop_sweeper`], and an
//! automatic abort when the last handle is dropped.

mod background;
mod cache;
mod config;
mod entry;
mod errors;
mod page;
mod stats;
mod token;

pub use cache::ResultCache;
pub use config::CacheConfig;
pub use errors::{CacheError, Result};
pub use page::{paginate, PageView};
pub use stats::CacheStatistics;
pub use token::ResultToken;

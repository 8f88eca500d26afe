//! Errors from [`crate::manager::CacheManager`] operations.

use thiserror::Error;

use vericache_core::CoreError;
use vericache_l2::L2Error;
use vericache_l3::L3Error;

/// Errors surfaced by the cache manager's read/write/invalidation paths.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// A registered fetcher returned an error rather than a value.
    #[error("fetcher failed: {0}")]
    FetchFailed(String),

    /// The caller's fetch deadline elapsed before the fetcher returned.
    #[error("fetch exceeded deadline of {deadline_ms}ms")]
    FetchDeadlineExceeded {
        /// The deadline that was exceeded.
        deadline_ms: u64,
    },

    /// `key` had no registered fetcher for its `fetcher_ref`.
    #[error("no fetcher registered for id: {0}")]
    UnknownFetcher(String),

    /// The serializer failed to encode or decode a stored value.
    #[error(transparent)]
    Serialization(#[from] CoreError),

    /// L2 degraded to a miss; carried for observability, not propagated to
    /// callers of `Get`.
    #[error(transparent)]
    L2(#[from] L2Error),

    /// L3 degraded to a miss; carried for observability, not propagated to
    /// callers of `Get`.
    #[error(transparent)]
    L3(#[from] L3Error),
}

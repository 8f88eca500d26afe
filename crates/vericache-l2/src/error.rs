//! Errors from L2 operations.

use thiserror::Error;
use vericache_circuitbreaker::TierUnavailable;

/// Errors from [`crate::adapter::L2Adapter`] operations.
#[derive(Debug, Error)]
pub enum L2Error {
    /// The key was not present in the remote store. Not a breaker-tripping
    /// failure.
    #[error("key not found")]
    NotFound,

    /// The call did not complete within the configured deadline.
    #[error("call exceeded deadline of {deadline_ms}ms")]
    Timeout {
        /// The deadline that was exceeded.
        deadline_ms: u64,
    },

    /// The circuit breaker rejected the call.
    #[error(transparent)]
    Breaker(#[from] TierUnavailable),

    /// The remote backend returned an error other than not-found.
    #[error("backend error: {0}")]
    Backend(String),
}

impl L2Error {
    /// Returns true if the caller should treat this the same as a miss
    /// (i.e. anything other than a genuine backend/breaker failure that
    /// should bump the breaker).
    pub fn is_not_found(&self) -> bool {
        matches!(self, L2Error::NotFound)
    }

    /// Returns true if this error should count against the circuit breaker.
    pub fn trips_breaker(&self) -> bool {
        !matches!(self, L2Error::NotFound | L2Error::Breaker(_))
    }
}

//! Errors raised by [`crate::store::L1Store`].

use thiserror::Error;

/// Errors from L1 operations. Both variants are non-fatal: the caller falls
/// through to L2/L3 as if the entry were absent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum L1Error {
    /// `Set` was rejected because the payload exceeds 10% of the store's
    /// byte capacity.
    #[error("entry of {size_bytes} bytes exceeds the per-entry cap of {max_bytes} bytes")]
    RejectedTooLarge {
        /// Size of the rejected payload.
        size_bytes: usize,
        /// The per-entry cap (10% of total capacity).
        max_bytes: usize,
    },
}

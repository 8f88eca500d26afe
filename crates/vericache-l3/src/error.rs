//! Errors from L3 projection reads.

use thiserror::Error;

/// Errors from [`crate::source::ProjectionSource`] operations.
#[derive(Debug, Error)]
pub enum L3Error {
    /// No projection is registered under the requested name.
    #[error("unknown projection: {0}")]
    UnknownProjection(String),

    /// The projection source failed to produce or refresh rows.
    #[error("projection source error: {0}")]
    Source(String),
}

//! The facade-level error type (component C12's boundary).
//!
//! Every internal crate keeps its own `error.rs`; nothing below this
//! boundary needs to know about any other crate's error type. `CacheError`
//! is where they're folded together into one enum a caller can match on.

use thiserror::Error;

use vericache_core::CoreError;
use vericache_l1::L1Error;
use vericache_l3::L3Error;
use vericache_manager::ManagerError;
use vericache_warming::QueueFull;

/// Errors surfaced across the authorization cache facade's public API.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache manager's read/write path failed in a way that wasn't
    /// already degraded to a miss.
    #[error(transparent)]
    Manager(#[from] ManagerError),

    /// L1 rejected a write; the caller's value was not stored in L1 (L2 may
    /// still have succeeded).
    #[error(transparent)]
    L1(#[from] L1Error),

    /// An L3 projection query failed in a way that wasn't degraded to a
    /// miss (e.g. the projection name itself is unregistered).
    #[error(transparent)]
    L3(#[from] L3Error),

    /// A reactive or burst-recovery warming enqueue found its target
    /// priority lane full.
    #[error(transparent)]
    WarmingQueueFull(#[from] QueueFull),

    /// The serializer failed to encode or decode a stored value.
    #[error(transparent)]
    Serialization(#[from] CoreError),

    /// A defensive invariant was violated. Logged and surfaced as a
    /// critical monitor alert; the caller still gets a miss rather than a
    /// panic.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

//! Errors raised by the warming queue and pool.

use thiserror::Error;

use crate::task::Priority;

/// The queue at `priority` is at capacity. A warning, not a hard failure:
/// callers should back off, not treat this as fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("warming queue full at priority {priority:?} (capacity {capacity})")]
pub struct QueueFull {
    /// The priority level whose sub-queue rejected the push.
    pub priority: Priority,
    /// The configured per-priority capacity.
    pub capacity: usize,
}

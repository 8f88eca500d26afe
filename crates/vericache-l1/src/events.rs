//! Events emitted by [`crate::store::L1Store`].

use std::time::Instant;

use vericache_core::CacheEvent;

/// An event emitted by L1 on a lookup or a store-maintenance action.
#[derive(Debug, Clone)]
pub enum L1Event {
    /// A `Get` found a live, unexpired entry.
    Hit {
        /// Store name, for multi-store deployments.
        store: String,
        /// The key that was looked up.
        key: String,
        /// When the hit occurred.
        timestamp: Instant,
    },
    /// A `Get` found nothing, or found an expired entry.
    Miss {
        /// Store name.
        store: String,
        /// The key that was looked up.
        key: String,
        /// When the miss occurred.
        timestamp: Instant,
    },
    /// An entry was evicted to make room for a `Set`.
    Eviction {
        /// Store name.
        store: String,
        /// The evicted key.
        key: String,
        /// When the eviction occurred.
        timestamp: Instant,
    },
}

impl CacheEvent for L1Event {
    fn event_type(&self) -> &'static str {
        match self {
            L1Event::Hit { .. } => "l1_hit",
            L1Event::Miss { .. } => "l1_miss",
            L1Event::Eviction { .. } => "l1_eviction",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            L1Event::Hit { timestamp, .. } => *timestamp,
            L1Event::Miss { timestamp, .. } => *timestamp,
            L1Event::Eviction { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            L1Event::Hit { store, .. } => store,
            L1Event::Miss { store, .. } => store,
            L1Event::Eviction { store, .. } => store,
        }
    }
}

//! Bounded, hybrid-eviction, TTL-aware in-process cache store.
//!
//! This is vericache's L1 tier (component C4): a single-lock map from key
//! to [`CacheEntry`], with recency, frequency, total-byte, and tag indices
//! maintained together so HYBRID eviction can score every candidate in one
//! pass.

pub mod config;
pub mod entry;
pub mod error;
pub mod eviction;
pub mod events;
pub mod store;

pub use config::{L1Config, L1ConfigBuilder};
pub use entry::CacheEntry;
pub use error::L1Error;
pub use eviction::EvictionPolicy;
pub use events::L1Event;
pub use store::{GetResult, L1Store};

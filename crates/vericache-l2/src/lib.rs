//! Breaker-guarded RPC client for vericache's remote L2 tier.
//!
//! Namespaces keys with a fixed prefix, serializes via `vericache_core`,
//! wraps every call in a [`vericache_circuitbreaker::Circuit`], and bounds
//! each call with a per-call deadline.

pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;

pub use adapter::L2Adapter;
pub use backend::{BackendError, BackendInfo, InMemoryRemote, RemoteBackend, ScanPage};
pub use config::L2Config;
pub use error::L2Error;

//! vericache: a tiered authorization cache with circuit breakers,
//! predictive warming, and performance monitoring.
//!
//! [`CacheRuntime`] builds and wires every tier; [`AuthorizationCacheFacade`]
//! is the domain-shaped API the rest of a process talks to.

pub mod config;
pub mod error;
pub mod facade;
pub mod permissions;
pub mod runtime;

pub use config::CacheRuntimeConfig;
pub use error::CacheError;
pub use facade::AuthorizationCacheFacade;
pub use permissions::{AuditTrail, Permissions, ServedBy, TeamAccess};
pub use runtime::CacheRuntime;

pub use vericache_l2::RemoteBackend;
pub use vericache_l3::{ProjectionReader, ProjectionSource};
pub use vericache_manager::{FetchContext, FetchFn, FetcherRegistry, HealthReport};

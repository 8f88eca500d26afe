//! Read-only access to materialized projections of the slow path.
//!
//! Consulted only when L1 and L2 both miss and the caller has no tighter
//! fallback.

pub mod error;
pub mod reader;
pub mod source;

pub use error::L3Error;
pub use reader::ProjectionReader;
pub use source::{Filter, ProjectionRow, ProjectionSource, StaticProjectionSource};

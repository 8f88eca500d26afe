//! Error type returned when the circuit refuses a call.

use thiserror::Error;

/// Raised by [`crate::Circuit::allow`] when the breaker is `OPEN`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("tier '{name}' is unavailable: circuit breaker is open")]
pub struct TierUnavailable {
    /// The breaker's configured name.
    pub name: String,
}

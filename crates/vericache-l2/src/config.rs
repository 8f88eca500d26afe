//! Configuration for [`crate::adapter::L2Adapter`].

use std::time::Duration;

use vericache_circuitbreaker::CircuitBreakerConfig;

/// Configuration for an [`crate::adapter::L2Adapter`].
#[derive(Debug, Clone)]
pub struct L2Config {
    /// Prefix every key is namespaced under, e.g. `"vc:l2:"`.
    pub key_prefix: String,
    /// Per-call deadline. Calls exceeding this return `L2Error::Timeout`.
    pub deadline: Duration,
    /// Circuit breaker configuration guarding every outbound call.
    pub breaker: CircuitBreakerConfig,
}

impl Default for L2Config {
    fn default() -> Self {
        Self {
            key_prefix: "vc:l2:".to_string(),
            deadline: Duration::from_millis(50),
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

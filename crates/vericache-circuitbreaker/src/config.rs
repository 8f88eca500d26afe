//! Configuration for [`crate::Circuit`].

use std::time::Duration;

/// Configuration for a [`crate::Circuit`].
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures that trips `CLOSED` into `OPEN`.
    pub failure_threshold: u32,
    /// How long the circuit stays `OPEN` before allowing a trial call in
    /// `HALF_OPEN`.
    pub recovery_window: Duration,
    /// A human-readable name used in events and error messages.
    pub name: String,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_window: Duration::from_secs(30),
            name: "l2".to_string(),
        }
    }
}

/// Builder for [`CircuitBreakerConfig`].
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder seeded with the default configuration.
    pub fn new() -> Self {
        Self {
            config: CircuitBreakerConfig::default(),
        }
    }

    /// Sets the consecutive-failure threshold that trips the breaker open.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    /// Sets how long the breaker stays open before trialing a half-open call.
    pub fn recovery_window(mut self, window: Duration) -> Self {
        self.config.recovery_window = window;
        self
    }

    /// Sets the breaker's name, surfaced in events and `TierUnavailable` errors.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CircuitBreakerConfig {
        self.config
    }
}

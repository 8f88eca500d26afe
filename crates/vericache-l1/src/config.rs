//! Configuration for [`crate::store::L1Store`].

use crate::eviction::EvictionPolicy;

/// Configuration for an [`crate::store::L1Store`].
#[derive(Debug, Clone)]
pub struct L1Config {
    /// Total byte capacity across all stored entries.
    pub capacity_bytes: usize,
    /// Eviction policy used when space must be freed.
    pub eviction_policy: EvictionPolicy,
    /// A name used in emitted events, e.g. `"verdicts"`.
    pub store_name: String,
}

impl Default for L1Config {
    fn default() -> Self {
        Self {
            capacity_bytes: 64 * 1024 * 1024,
            eviction_policy: EvictionPolicy::Hybrid,
            store_name: "l1".to_string(),
        }
    }
}

/// Builder for [`L1Config`].
#[derive(Debug, Default)]
pub struct L1ConfigBuilder {
    config: L1Config,
}

impl L1ConfigBuilder {
    /// Creates a new builder seeded with defaults.
    pub fn new() -> Self {
        Self {
            config: L1Config::default(),
        }
    }

    /// Sets the total byte capacity.
    pub fn capacity_bytes(mut self, capacity_bytes: usize) -> Self {
        self.config.capacity_bytes = capacity_bytes;
        self
    }

    /// Sets the eviction policy.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    /// Sets the store's name.
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.config.store_name = name.into();
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> L1Config {
        self.config
    }
}

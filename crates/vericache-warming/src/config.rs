//! Tunables for the warming queue, worker pool, and orchestrator.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for components C9 (queue), C10 (pool), and C11
/// (orchestrator).
#[derive(Debug, Clone)]
pub struct WarmingConfig {
    /// Per-priority queue capacity. Default 1000.
    pub queue_capacity_per_priority: usize,
    /// Number of cooperative workers draining the queue. Default 10.
    pub pool_size: usize,
    /// Tasks popped per batch, before clamping to `batch_max`. Default 50.
    pub batch_size: usize,
    /// Hard ceiling on a single batch regardless of `batch_size`.
    pub batch_max: usize,
    /// How long a throttled worker sleeps before retrying.
    pub throttle_poll_interval: Duration,
    /// Aggregate hit rate above which the pool throttles. Default 0.95.
    pub excellent_hit_rate_threshold: f64,
    /// Bounded completion-outcome ring size. Default 10_000.
    pub completion_ring_capacity: usize,
    /// How often the predictive strategy runs. Default 10 minutes.
    pub predictive_interval: Duration,
    /// How far ahead predictive warming looks for a predicted next access.
    /// Default 1 hour.
    pub predictive_lookahead: Duration,
    /// Minimum likely-resource probability to enqueue a predictive task.
    /// Default 0.10.
    pub predictive_probability_threshold: f64,
    /// Resource kinds warmed by the scheduled strategy's default pattern set.
    pub scheduled_pattern_set: Vec<String>,
    /// Hit rate below which burst recovery kicks in. Default 0.80.
    pub burst_recovery_threshold: f64,
    /// How many recently active users/teams/generations the startup
    /// strategy enumerates from L3, per category. Default 100.
    pub startup_enumeration_limit: usize,
    /// Fallback (L1, L2) TTLs for a warmed key whose `key_type` has no entry
    /// in `key_type_ttls`.
    pub default_key_ttl: (Duration, Duration),
    /// Per-`key_type` (L1, L2) TTL overrides.
    pub key_type_ttls: HashMap<String, (Duration, Duration)>,
}

impl WarmingConfig {
    /// Resolves the (L1, L2) TTL pair for a task's `key_type`, falling back
    /// to [`WarmingConfig::default_key_ttl`].
    pub fn ttl_for_key_type(&self, key_type: &str) -> (Duration, Duration) {
        self.key_type_ttls
            .get(key_type)
            .copied()
            .unwrap_or(self.default_key_ttl)
    }
}

impl Default for WarmingConfig {
    fn default() -> Self {
        Self {
            queue_capacity_per_priority: 1000,
            pool_size: 10,
            batch_size: 50,
            batch_max: 200,
            throttle_poll_interval: Duration::from_secs(1),
            excellent_hit_rate_threshold: 0.95,
            completion_ring_capacity: 10_000,
            predictive_interval: Duration::from_secs(10 * 60),
            predictive_lookahead: Duration::from_secs(3600),
            predictive_probability_threshold: 0.10,
            scheduled_pattern_set: vec!["authorization_verdicts".to_string()],
            burst_recovery_threshold: 0.80,
            startup_enumeration_limit: 100,
            default_key_ttl: (Duration::from_secs(300), Duration::from_secs(3600)),
            key_type_ttls: HashMap::new(),
        }
    }
}

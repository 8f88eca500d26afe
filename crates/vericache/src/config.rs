//! [`CacheRuntimeConfig`] (component C14): the one struct threading every
//! default tabulated in spec.md's external-interfaces section through to
//! each component's own config type.

use std::time::Duration;

use vericache_circuitbreaker::CircuitBreakerConfig;
use vericache_l1::{EvictionPolicy, L1Config};
use vericache_l2::L2Config;
use vericache_learner::{AccessPatternLearner, DEFAULT_PRUNE_CUTOFF_SECS};
use vericache_manager::ManagerConfig;
use vericache_monitor::MonitorConfig;
use vericache_warming::WarmingConfig;

/// Every configurable knob for a [`crate::runtime::CacheRuntime`], grouped
/// by the component it configures. Each field defaults to the value named
/// in the external-interfaces configuration table.
#[derive(Debug, Clone)]
pub struct CacheRuntimeConfig {
    /// L1 in-process store capacity and eviction policy.
    pub l1: L1Config,
    /// L2 remote adapter namespace, deadline, and breaker settings.
    pub l2: L2Config,
    /// Cache manager TTLs, deadlines, and maintenance schedule.
    pub manager: ManagerConfig,
    /// Warming queue/pool/orchestrator tuning.
    pub warming: WarmingConfig,
    /// Performance monitor thresholds and sampling cadence.
    pub monitor: MonitorConfig,
    /// Whether access-pattern learning is enabled at startup.
    pub pattern_learning_enabled: bool,
    /// Whether the predictive warming strategy runs on its own schedule.
    /// The cadence itself is `warming.predictive_interval`.
    pub predictive_warming_enabled: bool,
    /// How often the pattern pruner runs `AccessPatternLearner.Prune()`.
    pub pruner_interval: Duration,
    /// Idle cutoff passed to `Prune`: users untouched for longer than this
    /// have their record evicted.
    pub pruner_cutoff: Duration,
    /// Deadline the facade waits for background loops to drain on `Stop`.
    pub shutdown_deadline: Duration,
}

impl Default for CacheRuntimeConfig {
    fn default() -> Self {
        Self {
            l1: L1Config {
                capacity_bytes: 200 * 1024 * 1024,
                eviction_policy: EvictionPolicy::Hybrid,
                store_name: "vericache-l1".to_string(),
            },
            l2: L2Config {
                breaker: CircuitBreakerConfig {
                    failure_threshold: 5,
                    recovery_window: Duration::from_millis(30_000),
                    name: "vericache-l2".to_string(),
                },
                ..L2Config::default()
            },
            manager: ManagerConfig::default(),
            warming: WarmingConfig::default(),
            monitor: MonitorConfig::default(),
            pattern_learning_enabled: true,
            predictive_warming_enabled: true,
            pruner_interval: Duration::from_secs(3600),
            pruner_cutoff: Duration::from_secs(DEFAULT_PRUNE_CUTOFF_SECS),
            shutdown_deadline: Duration::from_secs(10),
        }
    }
}

impl CacheRuntimeConfig {
    pub(crate) fn apply_learner_defaults(&self, learner: &AccessPatternLearner) {
        learner.set_enabled(self.pattern_learning_enabled);
    }
}

//! Sampling cadence and alert thresholds for the performance monitor.

use std::time::Duration;

/// Threshold table from spec.md's §4.13, one field per signal.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Minimum acceptable aggregate hit rate across all tiers. Default 0.90.
    pub aggregate_hit_rate_min: f64,
    /// Maximum acceptable aggregate average latency. Default 100ms.
    pub aggregate_latency_max_ms: u64,
    /// Minimum acceptable L1 hit rate. Default 0.95.
    pub l1_hit_rate_min: f64,
    /// Maximum acceptable L1 average latency. Default 5ms.
    pub l1_latency_max_ms: u64,
    /// Minimum acceptable L2 hit rate. Default 0.85.
    pub l2_hit_rate_min: f64,
    /// Maximum acceptable L2 average latency. Default 20ms.
    pub l2_latency_max_ms: u64,
    /// Maximum acceptable L3 average latency. Default 100ms.
    pub l3_latency_max_ms: u64,
    /// Maximum acceptable authorization facade latency. Default 75ms.
    pub facade_latency_max_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            aggregate_hit_rate_min: 0.90,
            aggregate_latency_max_ms: 100,
            l1_hit_rate_min: 0.95,
            l1_latency_max_ms: 5,
            l2_hit_rate_min: 0.85,
            l2_latency_max_ms: 20,
            l3_latency_max_ms: 100,
            facade_latency_max_ms: 75,
        }
    }
}

/// Configuration for the performance monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How often a `TierSnapshot` is sampled. Default 30 seconds.
    pub monitoring_interval: Duration,
    /// Bounded snapshot history size. Default 1000.
    pub history_capacity: usize,
    /// Bounded closed-alert history size. Default 500.
    pub alert_history_capacity: usize,
    /// Number of most-recent samples compared against the previous window
    /// of the same size in trend analysis. Default 10.
    pub trend_window: usize,
    /// Alert thresholds.
    pub thresholds: Thresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            monitoring_interval: Duration::from_secs(30),
            history_capacity: 1000,
            alert_history_capacity: 500,
            trend_window: 10,
            thresholds: Thresholds::default(),
        }
    }
}

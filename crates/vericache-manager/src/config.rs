//! Configuration for [`crate::manager::CacheManager`].

use std::time::Duration;

/// Configuration for a [`crate::manager::CacheManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// TTL applied to entries written to L1 after an L3/fallback fetch.
    pub default_l1_ttl: Duration,
    /// TTL applied to entries written to L2 after an L3/fallback fetch.
    pub default_l2_ttl: Duration,
    /// Deadline for a `FetchFn` invocation.
    pub fetch_deadline: Duration,
    /// Deadline for an L3 query.
    pub l3_deadline: Duration,
    /// How often the sweeper runs `L1.Sweep()`.
    pub sweep_interval: Duration,
    /// Every how many sweeper ticks the L3 refresh for the standard
    /// projection set also runs (default 6, i.e. every 30 minutes at a
    /// 5-minute sweep interval — "on the half-hour").
    pub l3_refresh_every_n_sweeps: u32,
    /// How often the warmer trigger fires.
    pub warmer_interval: Duration,
    /// Projections refreshed by the sweeper's half-hourly tick.
    pub standard_projection_set: Vec<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_l1_ttl: Duration::from_secs(300),
            default_l2_ttl: Duration::from_secs(3600),
            fetch_deadline: Duration::from_secs(1),
            l3_deadline: Duration::from_millis(500),
            sweep_interval: Duration::from_secs(5 * 60),
            l3_refresh_every_n_sweeps: 6,
            warmer_interval: Duration::from_secs(30 * 60),
            standard_projection_set: vec!["authorization_verdicts".to_string()],
        }
    }
}

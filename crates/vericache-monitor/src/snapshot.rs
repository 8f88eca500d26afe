//! A point-in-time read of each tier's hit rate and latency.

use std::time::Instant;

/// Hit rate and average latency observed for a single tier over the window
/// ending at `taken_at`.
#[derive(Debug, Clone, Copy)]
pub struct TierStats {
    /// Number of calls observed during the window.
    pub calls: u64,
    /// Fraction of calls that were hits, in `[0.0, 1.0]`. `0.0` when `calls`
    /// is zero.
    pub hit_rate: f64,
    /// Average latency across all calls in the window, in milliseconds.
    pub avg_latency_ms: f64,
}

impl TierStats {
    pub(crate) const ZERO: Self = Self {
        calls: 0,
        hit_rate: 0.0,
        avg_latency_ms: 0.0,
    };
}

/// A snapshot of every tier's performance at one instant.
#[derive(Debug, Clone, Copy)]
pub struct TierSnapshot {
    /// When this snapshot was taken.
    pub taken_at: Instant,
    /// L1 (in-process) tier stats.
    pub l1: TierStats,
    /// L2 (shared/remote) tier stats.
    pub l2: TierStats,
    /// L3 (origin projection) tier stats. L3 has no hit/miss notion, so
    /// `hit_rate` is always `0.0`.
    pub l3: TierStats,
    /// End-to-end authorization facade latency stats. `hit_rate` is always
    /// `0.0`; the facade reports overall call latency, not a hit/miss.
    pub facade: TierStats,
}

impl TierSnapshot {
    /// The aggregate hit rate across L1 and L2, weighted by call count. L3
    /// and the facade have no hit/miss notion and are excluded.
    pub fn aggregate_hit_rate(&self) -> f64 {
        let total_calls = self.l1.calls + self.l2.calls;
        if total_calls == 0 {
            return 0.0;
        }
        let total_hits = (self.l1.hit_rate * self.l1.calls as f64)
            + (self.l2.hit_rate * self.l2.calls as f64);
        total_hits / total_calls as f64
    }

    /// The aggregate average latency across every tier, weighted by call
    /// count.
    pub fn aggregate_latency_ms(&self) -> f64 {
        let tiers = [self.l1, self.l2, self.l3, self.facade];
        let total_calls: u64 = tiers.iter().map(|t| t.calls).sum();
        if total_calls == 0 {
            return 0.0;
        }
        let weighted: f64 = tiers
            .iter()
            .map(|t| t.avg_latency_ms * t.calls as f64)
            .sum();
        weighted / total_calls as f64
    }
}

//! Trend analysis over recent snapshot history.
//!
//! Ported from the reference monitoring tool's trend analyzer: the most
//! recent window of samples is compared against the window immediately
//! before it, and a direction is assigned per metric based on the percentage
//! change between the two window averages.

use crate::snapshot::TierSnapshot;

/// Direction a metric moved between the previous and current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Improving,
    Degrading,
    Stable,
}

/// A metric's windowed average in the previous and current period, and the
/// direction implied by the change between them.
#[derive(Debug, Clone, Copy)]
pub struct MetricTrend {
    pub previous_avg: f64,
    pub current_avg: f64,
    pub direction: Direction,
}

/// Minimum fractional change between windows to call a metric "improving" or
/// "degrading" rather than "stable". Matches the reference tool's 5% noise
/// floor.
const STABILITY_EPSILON: f64 = 0.05;

fn trend_for(previous_avg: f64, current_avg: f64, higher_is_better: bool) -> MetricTrend {
    let direction = if previous_avg == 0.0 {
        Direction::Stable
    } else {
        let change = (current_avg - previous_avg) / previous_avg;
        if change.abs() < STABILITY_EPSILON {
            Direction::Stable
        } else if (change > 0.0) == higher_is_better {
            Direction::Improving
        } else {
            Direction::Degrading
        }
    };
    MetricTrend {
        previous_avg,
        current_avg,
        direction,
    }
}

/// A comparison of the last `window` samples against the `window` samples
/// before them.
#[derive(Debug, Clone, Copy)]
pub struct TrendReport {
    pub aggregate_hit_rate: MetricTrend,
    pub aggregate_latency: MetricTrend,
    pub l1_hit_rate: MetricTrend,
    pub l2_hit_rate: MetricTrend,
}

fn window_avg(samples: &[TierSnapshot], f: impl Fn(&TierSnapshot) -> f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(f).sum::<f64>() / samples.len() as f64
}

/// Builds a trend report from snapshot history, newest last. Returns `None`
/// if there are fewer than `2 * window` samples to compare.
pub fn analyze(history: &[TierSnapshot], window: usize) -> Option<TrendReport> {
    if history.len() < window * 2 || window == 0 {
        return None;
    }
    let current = &history[history.len() - window..];
    let previous = &history[history.len() - window * 2..history.len() - window];

    Some(TrendReport {
        aggregate_hit_rate: trend_for(
            window_avg(previous, TierSnapshot::aggregate_hit_rate),
            window_avg(current, TierSnapshot::aggregate_hit_rate),
            true,
        ),
        aggregate_latency: trend_for(
            window_avg(previous, TierSnapshot::aggregate_latency_ms),
            window_avg(current, TierSnapshot::aggregate_latency_ms),
            false,
        ),
        l1_hit_rate: trend_for(
            window_avg(previous, |s| s.l1.hit_rate),
            window_avg(current, |s| s.l1.hit_rate),
            true,
        ),
        l2_hit_rate: trend_for(
            window_avg(previous, |s| s.l2.hit_rate),
            window_avg(current, |s| s.l2.hit_rate),
            true,
        ),
    })
}

/// Generates human-readable optimization suggestions from a trend report,
/// the same cases the reference analyzer flags: degrading hit rates suggest
/// warming or TTL tuning, degrading latency suggests capacity or breaker
/// review.
pub fn recommendations(report: &TrendReport) -> Vec<String> {
    let mut out = Vec::new();

    if report.aggregate_hit_rate.direction == Direction::Degrading {
        out.push(
            "Aggregate hit rate is degrading; consider widening predictive warming coverage \
             or increasing TTLs for frequently-accessed key types."
                .to_string(),
        );
    }
    if report.l1_hit_rate.direction == Direction::Degrading {
        out.push(
            "L1 hit rate is degrading; consider increasing L1 capacity or reviewing eviction \
             policy."
                .to_string(),
        );
    }
    if report.l2_hit_rate.direction == Direction::Degrading {
        out.push(
            "L2 hit rate is degrading; check for circuit breaker trips or upstream L2 \
             instability."
                .to_string(),
        );
    }
    if report.aggregate_latency.direction == Direction::Degrading {
        out.push(
            "Aggregate latency is degrading; check tier capacity and recent circuit breaker \
             activity before it crosses the alert threshold."
                .to_string(),
        );
    }
    if out.is_empty() {
        out.push("No degrading trends detected; current configuration appears stable.".to_string());
    }
    out
}

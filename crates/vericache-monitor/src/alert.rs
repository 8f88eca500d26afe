//! Threshold alerts and the event they're published as.

use std::time::Instant;
use vericache_core::CacheEvent;

/// Which tier or cross-tier metric an alert concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertMetric {
    AggregateHitRate,
    AggregateLatency,
    L1HitRate,
    L1Latency,
    L2HitRate,
    L2Latency,
    L3Latency,
    FacadeLatency,
}

impl AlertMetric {
    fn label(self) -> &'static str {
        match self {
            AlertMetric::AggregateHitRate => "aggregate hit rate",
            AlertMetric::AggregateLatency => "aggregate latency",
            AlertMetric::L1HitRate => "L1 hit rate",
            AlertMetric::L1Latency => "L1 latency",
            AlertMetric::L2HitRate => "L2 hit rate",
            AlertMetric::L2Latency => "L2 latency",
            AlertMetric::L3Latency => "L3 latency",
            AlertMetric::FacadeLatency => "facade latency",
        }
    }
}

/// Severity of an alert, ordered least to most severe. Assigned from how far
/// past its threshold the observed value is: `Critical` is reserved for
/// metrics that have breached their threshold by more than 50%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
    Critical,
}

/// An open or recently closed threshold breach.
#[derive(Debug, Clone)]
pub struct Alert {
    pub metric: AlertMetric,
    pub level: AlertLevel,
    pub observed: f64,
    pub threshold: f64,
    pub opened_at: Instant,
    pub closed_at: Option<Instant>,
}

impl Alert {
    pub(crate) fn new(
        metric: AlertMetric,
        level: AlertLevel,
        observed: f64,
        threshold: f64,
        opened_at: Instant,
    ) -> Self {
        Self {
            metric,
            level,
            observed,
            threshold,
            opened_at,
            closed_at: None,
        }
    }

    /// A human-readable description, e.g. "L1 hit rate 0.81 breached minimum 0.95".
    pub fn description(&self) -> String {
        format!(
            "{} {:.3} breached threshold {:.3}",
            self.metric.label(),
            self.observed,
            self.threshold
        )
    }
}

/// Published whenever an alert opens or closes.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub alert: Alert,
    pub opened: bool,
    component_name: String,
    timestamp: Instant,
}

impl AlertEvent {
    pub(crate) fn opened(alert: Alert, component_name: String, timestamp: Instant) -> Self {
        Self {
            alert,
            opened: true,
            component_name,
            timestamp,
        }
    }

    pub(crate) fn closed(alert: Alert, component_name: String, timestamp: Instant) -> Self {
        Self {
            alert,
            opened: false,
            component_name,
            timestamp,
        }
    }
}

impl CacheEvent for AlertEvent {
    fn event_type(&self) -> &'static str {
        if self.opened {
            "alert_opened"
        } else {
            "alert_closed"
        }
    }

    fn timestamp(&self) -> Instant {
        self.timestamp
    }

    fn component_name(&self) -> &str {
        &self.component_name
    }
}

//! The performance monitor: samples per-tier counters on an interval,
//! raises and clears threshold alerts, and answers trend queries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use vericache_core::{CacheObserver, Clock, EventListeners};

use crate::alert::{Alert, AlertEvent, AlertLevel, AlertMetric};
use crate::config::MonitorConfig;
use crate::snapshot::{TierSnapshot, TierStats};
use crate::trend::{self, TrendReport};

#[derive(Default)]
struct TierCounters {
    calls: AtomicU64,
    hits: AtomicU64,
    total_latency_us: AtomicU64,
}

impl TierCounters {
    fn record(&self, hit: bool, latency_ms: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_us
            .fetch_add(latency_ms * 1_000, Ordering::Relaxed);
    }

    /// Records a call with no hit/miss notion (L3 and the facade), so
    /// `hit_rate` stays `0.0` for these tiers.
    fn record_latency(&self, latency_ms: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us
            .fetch_add(latency_ms * 1_000, Ordering::Relaxed);
    }

    /// Reads and resets the counters, returning a `TierStats` for the window
    /// that just elapsed.
    fn drain(&self) -> TierStats {
        let calls = self.calls.swap(0, Ordering::Relaxed);
        let hits = self.hits.swap(0, Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.swap(0, Ordering::Relaxed);
        if calls == 0 {
            return TierStats::ZERO;
        }
        TierStats {
            calls,
            hit_rate: hits as f64 / calls as f64,
            avg_latency_ms: (total_latency_us as f64 / 1_000.0) / calls as f64,
        }
    }
}

/// Component name reported on emitted [`AlertEvent`]s.
const COMPONENT_NAME: &str = "vericache-monitor";

/// Samples `CacheObserver` calls into per-tier windows, raises threshold
/// alerts, and exposes trend analysis over the snapshot history.
///
/// Constructed independently of the cache manager and warming pool; wired in
/// afterward via `CacheManager::wire_observer` and
/// `WarmingWorkerPool::wire_hit_rate_source` so neither of those crates needs
/// a direct dependency on this one.
pub struct PerformanceMonitor {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    l1: TierCounters,
    l2: TierCounters,
    l3: TierCounters,
    facade: TierCounters,
    history: RwLock<Vec<TierSnapshot>>,
    active_alerts: RwLock<HashMap<AlertMetric, Alert>>,
    alert_history: RwLock<Vec<Alert>>,
    listeners: RwLock<EventListeners<AlertEvent>>,
    last_snapshot: RwLock<Option<TierSnapshot>>,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            l1: TierCounters::default(),
            l2: TierCounters::default(),
            l3: TierCounters::default(),
            facade: TierCounters::default(),
            history: RwLock::new(Vec::new()),
            active_alerts: RwLock::new(HashMap::new()),
            alert_history: RwLock::new(Vec::new()),
            listeners: RwLock::new(EventListeners::new()),
            last_snapshot: RwLock::new(None),
        }
    }

    /// Registers a listener for alert open/close events.
    pub fn add_alert_listener<L>(&self, listener: L)
    where
        L: vericache_core::EventListener<AlertEvent> + 'static,
    {
        self.listeners
            .write()
            .expect("monitor listeners lock poisoned")
            .add(listener);
    }

    /// Samples all tier counters, records a snapshot, and evaluates alert
    /// thresholds against it. Returns the snapshot taken.
    pub fn sample(&self) -> TierSnapshot {
        let snapshot = TierSnapshot {
            taken_at: self.clock.now(),
            l1: self.l1.drain(),
            l2: self.l2.drain(),
            l3: self.l3.drain(),
            facade: self.facade.drain(),
        };

        {
            let mut history = self.history.write().expect("monitor history lock poisoned");
            history.push(snapshot);
            if history.len() > self.config.history_capacity {
                let overflow = history.len() - self.config.history_capacity;
                history.drain(0..overflow);
            }
        }
        *self.last_snapshot.write().expect("monitor snapshot lock poisoned") = Some(snapshot);

        self.evaluate_thresholds(&snapshot);
        snapshot
    }

    fn evaluate_thresholds(&self, snapshot: &TierSnapshot) {
        let t = &self.config.thresholds;
        self.check(
            AlertMetric::AggregateHitRate,
            snapshot.aggregate_hit_rate(),
            t.aggregate_hit_rate_min,
            Breach::Below,
        );
        self.check(
            AlertMetric::AggregateLatency,
            snapshot.aggregate_latency_ms(),
            t.aggregate_latency_max_ms as f64,
            Breach::Above,
        );
        self.check(
            AlertMetric::L1HitRate,
            snapshot.l1.hit_rate,
            t.l1_hit_rate_min,
            Breach::Below,
        );
        self.check(
            AlertMetric::L1Latency,
            snapshot.l1.avg_latency_ms,
            t.l1_latency_max_ms as f64,
            Breach::Above,
        );
        self.check(
            AlertMetric::L2HitRate,
            snapshot.l2.hit_rate,
            t.l2_hit_rate_min,
            Breach::Below,
        );
        self.check(
            AlertMetric::L2Latency,
            snapshot.l2.avg_latency_ms,
            t.l2_latency_max_ms as f64,
            Breach::Above,
        );
        self.check(
            AlertMetric::L3Latency,
            snapshot.l3.avg_latency_ms,
            t.l3_latency_max_ms as f64,
            Breach::Above,
        );
        self.check(
            AlertMetric::FacadeLatency,
            snapshot.facade.avg_latency_ms,
            t.facade_latency_max_ms as f64,
            Breach::Above,
        );
    }

    fn check(&self, metric: AlertMetric, observed: f64, threshold: f64, direction: Breach) {
        let breached = match direction {
            Breach::Below => observed < threshold,
            Breach::Above => observed > threshold,
        };

        let mut active = self
            .active_alerts
            .write()
            .expect("monitor active alerts lock poisoned");

        if breached {
            if let Some(existing) = active.get_mut(&metric) {
                existing.observed = observed;
                return;
            }
            let overage = match direction {
                Breach::Below => (threshold - observed) / threshold.max(f64::EPSILON),
                Breach::Above => (observed - threshold) / threshold.max(f64::EPSILON),
            };
            let level = if overage > 0.5 {
                AlertLevel::Critical
            } else if overage > 0.3 {
                AlertLevel::Error
            } else if overage > 0.15 {
                AlertLevel::Warning
            } else {
                AlertLevel::Info
            };
            let now = self.clock.now();
            let alert = Alert::new(metric, level, observed, threshold, now);
            let event = AlertEvent::opened(alert.clone(), COMPONENT_NAME.to_string(), now);
            active.insert(metric, alert);
            drop(active);
            self.emit(&event);
        } else if let Some(mut alert) = active.remove(&metric) {
            drop(active);
            let now = self.clock.now();
            alert.closed_at = Some(now);
            self.record_closed(alert.clone());
            let event = AlertEvent::closed(alert, COMPONENT_NAME.to_string(), now);
            self.emit(&event);
        }
    }

    fn record_closed(&self, alert: Alert) {
        let mut history = self
            .alert_history
            .write()
            .expect("monitor alert history lock poisoned");
        history.push(alert);
        if history.len() > self.config.alert_history_capacity {
            let overflow = history.len() - self.config.alert_history_capacity;
            history.drain(0..overflow);
        }
    }

    fn emit(&self, event: &AlertEvent) {
        self.listeners
            .read()
            .expect("monitor listeners lock poisoned")
            .emit(event);
    }

    /// Currently open alerts.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.active_alerts
            .read()
            .expect("monitor active alerts lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Closed alerts, oldest first, bounded to `alert_history_capacity`.
    pub fn alert_history(&self) -> Vec<Alert> {
        self.alert_history
            .read()
            .expect("monitor alert history lock poisoned")
            .clone()
    }

    /// Compares the most recent `trend_window` snapshots against the window
    /// before them. `None` until enough history has accumulated.
    pub fn trend_report(&self) -> Option<TrendReport> {
        let history = self.history.read().expect("monitor history lock poisoned");
        trend::analyze(&history, self.config.trend_window)
    }

    /// Optimization suggestions derived from the current trend report. Empty
    /// until a trend report is available.
    pub fn recommendations(&self) -> Vec<String> {
        self.trend_report()
            .map(|report| trend::recommendations(&report))
            .unwrap_or_default()
    }

    /// Runs the sampling loop until `cancellation` is triggered.
    pub async fn run_sampler(&self, cancellation: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = tokio::time::sleep(self.config.monitoring_interval) => {
                    self.sample();
                }
            }
        }
    }
}

enum Breach {
    Below,
    Above,
}

impl CacheObserver for PerformanceMonitor {
    fn observe_l1(&self, hit: bool, latency_ms: u64) {
        self.l1.record(hit, latency_ms);
    }

    fn observe_l2(&self, hit: bool, latency_ms: u64, _breaker_open: bool) {
        self.l2.record(hit, latency_ms);
    }

    fn observe_l3(&self, latency_ms: u64) {
        self.l3.record_latency(latency_ms);
    }

    fn observe_facade(&self, latency_ms: u64) {
        self.facade.record_latency(latency_ms);
    }
}

impl vericache_warming::HitRateSource for PerformanceMonitor {
    fn aggregate_hit_rate(&self) -> f64 {
        self.last_snapshot
            .read()
            .expect("monitor snapshot lock poisoned")
            .as_ref()
            .map(TierSnapshot::aggregate_hit_rate)
            .unwrap_or(0.0)
    }
}

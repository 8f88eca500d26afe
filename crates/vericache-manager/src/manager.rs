//! The cache manager: orchestrates L1 -> L2 -> L3-or-fallback reads,
//! dual-tier writes, invalidation, and promotion (component C7).

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use vericache_core::{CacheObserver, Clock};
use vericache_l1::{GetResult as L1GetResult, L1Store};
use vericache_l2::L2Adapter;
use vericache_l3::{Filter, ProjectionReader};

use crate::error::ManagerError;
use crate::fetch::{FetchContext, FetchFn};

/// Which tier (or fallback path) satisfied a `Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Served from L1.
    L1,
    /// Served from L2, and promoted into L1.
    L2,
    /// Served from L3's materialized projection.
    L3,
    /// Served by the caller-supplied `FetchFn`.
    Fallback,
    /// Not found anywhere.
    Miss,
}

/// Result of both tiers' write attempts.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteResult {
    /// Whether the L1 write succeeded.
    pub l1_ok: bool,
    /// Whether the L2 write succeeded.
    pub l2_ok: bool,
}

/// Per-tier and overall availability, for `Health()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    /// L1 is in-process and always available.
    pub l1_ok: bool,
    /// True unless L2's breaker is open.
    pub l2_ok: bool,
    /// True unless a registered L3 projection source failed to refresh.
    pub l3_ok: bool,
    /// `l1_ok && l2_ok && l3_ok`.
    pub overall_ok: bool,
}

/// Called on the warmer-trigger schedule. The facade wires a concrete
/// implementation in after construction (two-phase wiring), so the manager
/// never owns a direct dependency on the warming orchestrator.
#[async_trait]
pub trait WarmTrigger: Send + Sync {
    /// Invoked every `warmer_interval` with the default warming pattern set.
    async fn trigger_default_warming(&self);
}

#[derive(Serialize, Deserialize)]
struct StoredValue {
    payload: Vec<u8>,
    expires_at_unix: Option<u64>,
}

/// Orchestrates vericache's L1/L2/L3 read path, the dual-tier write path,
/// invalidation, promotion, and background maintenance.
pub struct CacheManager {
    l1: Arc<L1Store>,
    l2: Arc<L2Adapter>,
    l3: Arc<ProjectionReader>,
    clock: Arc<dyn Clock>,
    config: crate::config::ManagerConfig,
    warm_trigger: RwLock<Option<Arc<dyn WarmTrigger>>>,
    observer: RwLock<Option<Arc<dyn CacheObserver>>>,
    sweep_ticks: AtomicU32,
}

impl CacheManager {
    /// Creates a new manager over the three tiers.
    pub fn new(
        l1: Arc<L1Store>,
        l2: Arc<L2Adapter>,
        l3: Arc<ProjectionReader>,
        clock: Arc<dyn Clock>,
        config: crate::config::ManagerConfig,
    ) -> Self {
        Self {
            l1,
            l2,
            l3,
            clock,
            config,
            warm_trigger: RwLock::new(None),
            observer: RwLock::new(None),
            sweep_ticks: AtomicU32::new(0),
        }
    }

    /// Wires a warm trigger in after construction, breaking the
    /// manager<->warming-orchestrator reference cycle.
    pub fn wire_warm_trigger(&self, trigger: Arc<dyn WarmTrigger>) {
        *self.warm_trigger.write().expect("warm trigger lock poisoned") = Some(trigger);
    }

    /// Wires a performance observer in after construction, breaking the
    /// manager<->monitor reference cycle.
    pub fn wire_observer(&self, observer: Arc<dyn CacheObserver>) {
        *self.observer.write().expect("observer lock poisoned") = Some(observer);
    }

    /// Invokes the wired [`WarmTrigger`] immediately, outside its own
    /// background schedule. A no-op if nothing has been wired yet.
    pub async fn warm_now(&self) {
        let trigger = self.warm_trigger.read().expect("warm trigger lock poisoned").clone();
        if let Some(trigger) = trigger {
            trigger.trigger_default_warming().await;
        }
    }

    /// Reports per-tier availability: L1 is always up, L2 is up unless its
    /// breaker is open, L3 is up unless a registered projection source fails
    /// to refresh.
    pub async fn health(&self) -> HealthReport {
        let l1_ok = true;
        let l2_ok = self.l2.circuit().state() != vericache_circuitbreaker::CircuitState::Open;
        let l3_ok = self.l3.is_reachable().await;

        HealthReport {
            l1_ok,
            l2_ok,
            l3_ok,
            overall_ok: l1_ok && l2_ok && l3_ok,
        }
    }

    fn notify_l1(&self, hit: bool, latency_ms: u64) {
        if let Some(observer) = self.observer.read().expect("observer lock poisoned").as_ref() {
            observer.observe_l1(hit, latency_ms);
        }
    }

    fn notify_l2(&self, hit: bool, latency_ms: u64, breaker_open: bool) {
        if let Some(observer) = self.observer.read().expect("observer lock poisoned").as_ref() {
            observer.observe_l2(hit, latency_ms, breaker_open);
        }
    }

    fn notify_l3(&self, latency_ms: u64) {
        if let Some(observer) = self.observer.read().expect("observer lock poisoned").as_ref() {
            observer.observe_l3(latency_ms);
        }
    }

    /// Reads `key`, probing L1 then L2 then (if no `fallback` was supplied)
    /// L3, then `fallback` if one was given. A lower-tier hit is promoted
    /// into higher tiers with TTLs clamped to the remaining lifetime of the
    /// value that was found.
    pub async fn get(
        &self,
        key: &str,
        key_type: &str,
        fallback: Option<Arc<dyn FetchFn>>,
    ) -> Result<(Option<Vec<u8>>, Source), ManagerError> {
        let l1_started = self.clock.now();
        let l1_result = self.l1.get(key);
        self.notify_l1(
            matches!(l1_result, L1GetResult::Hit(_)),
            self.clock.now().duration_since(l1_started).as_millis() as u64,
        );
        if let L1GetResult::Hit(payload) = l1_result {
            return Ok((Some(payload), Source::L1));
        }

        let l2_started = self.clock.now();
        let l2_result = self.l2.get(key).await;
        let breaker_open = self.l2.circuit().state() == vericache_circuitbreaker::CircuitState::Open;
        self.notify_l2(
            matches!(l2_result, Ok(Some(_))),
            self.clock.now().duration_since(l2_started).as_millis() as u64,
            breaker_open,
        );
        match l2_result {
            Ok(Some(bytes)) => {
                let stored: StoredValue = vericache_core::decode(&bytes)?;
                let remaining = remaining_ttl(&stored, self.clock.unix_now());
                let l1_ttl = clamp_ttl(self.config.default_l1_ttl, remaining);
                let _ = self.l1.set(
                    key,
                    stored.payload.clone(),
                    false,
                    l1_ttl.map(|d| d.as_secs()),
                    5,
                    BTreeSet::new(),
                );
                return Ok((Some(stored.payload), Source::L2));
            }
            Ok(None) => {}
            Err(_degraded_to_miss) => {}
        }

        if let Some(fetcher) = fallback {
            let ctx = FetchContext {
                key: key.to_string(),
                key_type: key_type.to_string(),
            };
            let outcome = tokio::time::timeout(self.config.fetch_deadline, fetcher.call(&ctx))
                .await
                .map_err(|_| ManagerError::FetchDeadlineExceeded {
                    deadline_ms: self.config.fetch_deadline.as_millis() as u64,
                })?
                .map_err(ManagerError::FetchFailed)?;

            return match outcome {
                Some(payload) => {
                    self.populate_both_tiers(key, payload.clone()).await;
                    Ok((Some(payload), Source::Fallback))
                }
                None => Ok((None, Source::Miss)),
            };
        }

        let l3_started = self.clock.now();
        let rows = self
            .l3
            .fetch_projection(key_type, &Filter::any(), 1)
            .await?;
        self.notify_l3(self.clock.now().duration_since(l3_started).as_millis() as u64);

        match rows.into_iter().find(|row| row.key == key) {
            Some(row) => {
                self.populate_both_tiers(key, row.payload.clone()).await;
                Ok((Some(row.payload), Source::L3))
            }
            None => Ok((None, Source::Miss)),
        }
    }

    /// Writes `value` under `key` to both tiers with independent TTLs.
    /// Partial success is acceptable and reported, never thrown.
    pub async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        l1_ttl: Option<Duration>,
        l2_ttl: Option<Duration>,
        priority: u8,
        tags: BTreeSet<String>,
    ) -> WriteResult {
        let l1_ok = self
            .l1
            .set(
                key,
                value.clone(),
                false,
                l1_ttl.map(|d| d.as_secs()),
                priority,
                tags,
            )
            .is_ok();

        let stored = StoredValue {
            payload: value,
            expires_at_unix: l2_ttl.map(|d| self.clock.unix_now() + d.as_secs()),
        };
        let l2_ok = match vericache_core::encode(&stored) {
            Ok(encoded) => self
                .l2
                .set(key, encoded.bytes, l2_ttl.map(|d| d.as_secs()))
                .await
                .is_ok(),
            Err(_) => false,
        };

        WriteResult { l1_ok, l2_ok }
    }

    /// Clears `key` from both tiers.
    pub async fn invalidate(&self, key: &str) {
        self.l1.delete(key);
        let _ = self.l2.delete(key).await;
    }

    /// Clears every key matching `pattern` from both tiers. L1 applies the
    /// pattern over its own key set; L2 performs a server-side cursor scan.
    pub async fn invalidate_pattern(&self, pattern: &str) {
        // L1's key set is bounded; a linear glob pass is acceptable here.
        self.l1.delete_by_pattern(pattern);
        let _ = self.l2.delete_by_pattern(pattern).await;
    }

    /// Clears every key tagged `tag` from both tiers.
    pub async fn invalidate_by_tag(&self, tag: &str) {
        self.l1.delete_by_tag(tag);
        let _ = self.l2.delete_by_pattern(&format!("*{tag}*")).await;
    }

    /// Runs the sweeper loop until `cancellation` fires: every
    /// `sweep_interval`, sweeps L1; every `l3_refresh_every_n_sweeps` ticks,
    /// also refreshes the standard projection set.
    pub async fn run_sweeper(&self, cancellation: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.sweep_interval);
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = interval.tick() => {
                    self.l1.sweep();
                    let tick = self.sweep_ticks.fetch_add(1, Ordering::AcqRel) + 1;
                    if tick % self.config.l3_refresh_every_n_sweeps == 0 {
                        for name in &self.config.standard_projection_set {
                            let _ = self.l3.refresh_projection(name).await;
                        }
                    }
                }
            }
        }
    }

    /// Runs the warmer-trigger loop until `cancellation` fires: every
    /// `warmer_interval`, invokes the wired [`WarmTrigger`], if any.
    pub async fn run_warmer_trigger(&self, cancellation: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.warmer_interval);
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = interval.tick() => {
                    let trigger = self.warm_trigger.read().expect("warm trigger lock poisoned").clone();
                    if let Some(trigger) = trigger {
                        trigger.trigger_default_warming().await;
                    }
                }
            }
        }
    }

    async fn populate_both_tiers(&self, key: &str, payload: Vec<u8>) {
        let _ = self.l1.set(
            key,
            payload.clone(),
            false,
            Some(self.config.default_l1_ttl.as_secs()),
            5,
            BTreeSet::new(),
        );

        let stored = StoredValue {
            payload,
            expires_at_unix: Some(self.clock.unix_now() + self.config.default_l2_ttl.as_secs()),
        };
        if let Ok(encoded) = vericache_core::encode(&stored) {
            let _ = self
                .l2
                .set(key, encoded.bytes, Some(self.config.default_l2_ttl.as_secs()))
                .await;
        }
    }
}

fn remaining_ttl(stored: &StoredValue, now_unix: u64) -> Option<Duration> {
    stored
        .expires_at_unix
        .map(|expires_at| Duration::from_secs(expires_at.saturating_sub(now_unix)))
}

fn clamp_ttl(configured: Duration, remaining: Option<Duration>) -> Option<Duration> {
    match remaining {
        Some(remaining) => Some(configured.min(remaining)),
        None => Some(configured),
    }
}

//! The access-pattern learner itself (component C8): per-user records plus
//! global aggregates, sharded by user ID via `dashmap`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use vericache_core::Clock;

use crate::global::GlobalPatterns;
use crate::pattern::AccessPatternRecord;

/// Default idle cutoff after which a user's record is pruned: 7 days.
pub const DEFAULT_PRUNE_CUTOFF_SECS: u64 = 7 * 24 * 3600;

/// Maintains per-user [`AccessPatternRecord`]s and a [`GlobalPatterns`]
/// aggregate. The only ingress is [`AccessPatternLearner::record_access`].
pub struct AccessPatternLearner {
    records: DashMap<String, AccessPatternRecord>,
    global: Mutex<GlobalPatterns>,
    clock: Arc<dyn Clock>,
    enabled: AtomicBool,
}

impl AccessPatternLearner {
    /// Creates a new learner. Pattern learning starts enabled.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            global: Mutex::new(GlobalPatterns::new()),
            clock,
            enabled: AtomicBool::new(true),
        }
    }

    /// Enables or disables pattern learning globally. While disabled,
    /// `record_access` is a no-op and predictions return empty.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Returns whether pattern learning is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Records one access. No-op while disabled.
    pub fn record_access(&self, user_id: &str, resource_kind: &str, operation: &str, session_tag: &str) {
        if !self.is_enabled() {
            return;
        }

        let now = self.clock.unix_now();
        self.records
            .entry(user_id.to_string())
            .or_insert_with(|| AccessPatternRecord::new(user_id, now))
            .record(now, resource_kind, operation, session_tag);

        self.global
            .lock()
            .expect("global patterns mutex poisoned")
            .record(now, resource_kind, operation);
    }

    /// Predicts `user`'s next access time. Returns `None` while disabled or
    /// with too few samples.
    pub fn next_access_time(&self, user: &str) -> Option<u64> {
        if !self.is_enabled() {
            return None;
        }
        self.records.get(user)?.next_access_time()
    }

    /// Returns `user`'s `top_n` likely resource kinds. Returns an empty
    /// vector while disabled or with no history.
    pub fn likely_resources(&self, user: &str, top_n: usize) -> Vec<(String, f64)> {
        if !self.is_enabled() {
            return Vec::new();
        }
        self.records
            .get(user)
            .map(|record| record.likely_resources(top_n))
            .unwrap_or_default()
    }

    /// Removes per-user records idle since before `cutoff` (a Unix
    /// timestamp), and prunes the global aggregate's own buckets.
    pub fn prune(&self, cutoff: u64) {
        self.records.retain(|_, record| record.last_updated >= cutoff);

        let now = self.clock.unix_now();
        self.global
            .lock()
            .expect("global patterns mutex poisoned")
            .prune(now, now.saturating_sub(cutoff));
    }

    /// Runs the pattern pruner loop until `cancellation` fires: every
    /// `interval`, removes per-user records idle since before `cutoff` ago.
    pub async fn run_pruner(&self, interval: Duration, cutoff: Duration, cancellation: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = ticker.tick() => {
                    let now = self.clock.unix_now();
                    self.prune(now.saturating_sub(cutoff.as_secs()));
                }
            }
        }
    }

    /// Returns the number of tracked per-user records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns a snapshot of every tracked user ID, for callers that need to
    /// iterate predictions across the whole population (e.g. predictive
    /// warming).
    pub fn users(&self) -> Vec<String> {
        self.records.iter().map(|entry| entry.key().clone()).collect()
    }
}

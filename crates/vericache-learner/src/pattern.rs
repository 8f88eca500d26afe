//! [`AccessPatternRecord`]: the per-user access history the learner predicts
//! from.

use std::collections::{HashMap, VecDeque};

/// Caps the number of recent access timestamps kept per user.
pub const ACCESS_RING_CAP: usize = 1000;

/// Caps the number of recent access timestamps kept per session.
pub const SESSION_RING_CAP: usize = 100;

/// Minimum samples before [`AccessPatternRecord::next_access_time`] returns
/// a prediction.
pub const MIN_SAMPLES_FOR_PREDICTION: usize = 5;

/// Per-user access history, used to predict when a user will next need a
/// resource and which kinds they're likely to touch.
#[derive(Debug, Clone)]
pub struct AccessPatternRecord {
    /// The user this record tracks.
    pub user_id: String,
    recent_access: VecDeque<u64>,
    resource_kind_freq: HashMap<String, u64>,
    operation_freq: HashMap<String, u64>,
    session_rings: HashMap<String, VecDeque<u64>>,
    /// Unix timestamp of the most recent [`AccessPatternRecord::record`].
    pub last_updated: u64,
}

impl AccessPatternRecord {
    /// Creates an empty record for `user_id`.
    pub fn new(user_id: impl Into<String>, now: u64) -> Self {
        Self {
            user_id: user_id.into(),
            recent_access: VecDeque::new(),
            resource_kind_freq: HashMap::new(),
            operation_freq: HashMap::new(),
            session_rings: HashMap::new(),
            last_updated: now,
        }
    }

    /// Records one access at `now`, bumping all rings and frequency tables.
    /// `last_updated` only moves forward, matching monotonicity.
    pub fn record(&mut self, now: u64, resource_kind: &str, operation: &str, session_tag: &str) {
        push_bounded(&mut self.recent_access, now, ACCESS_RING_CAP);
        *self
            .resource_kind_freq
            .entry(resource_kind.to_string())
            .or_insert(0) += 1;
        *self
            .operation_freq
            .entry(operation.to_string())
            .or_insert(0) += 1;

        let session_ring = self
            .session_rings
            .entry(session_tag.to_string())
            .or_default();
        push_bounded(session_ring, now, SESSION_RING_CAP);

        self.last_updated = self.last_updated.max(now);
    }

    /// Predicts the next access time as `last_access + mean(intervals)`,
    /// once at least [`MIN_SAMPLES_FOR_PREDICTION`] samples exist.
    pub fn next_access_time(&self) -> Option<u64> {
        if self.recent_access.len() < MIN_SAMPLES_FOR_PREDICTION {
            return None;
        }

        let intervals: Vec<u64> = self
            .recent_access
            .iter()
            .zip(self.recent_access.iter().skip(1))
            .map(|(a, b)| b.saturating_sub(*a))
            .collect();

        if intervals.is_empty() {
            return None;
        }

        let mean = intervals.iter().sum::<u64>() / intervals.len() as u64;
        let last_access = *self.recent_access.back()?;
        Some(last_access + mean)
    }

    /// Returns the `top_n` resource kinds by empirical frequency, descending.
    pub fn likely_resources(&self, top_n: usize) -> Vec<(String, f64)> {
        let total: u64 = self.resource_kind_freq.values().sum();
        if total == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(String, f64)> = self
            .resource_kind_freq
            .iter()
            .map(|(kind, count)| (kind.clone(), *count as f64 / total as f64))
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_n);
        ranked
    }
}

fn push_bounded(ring: &mut VecDeque<u64>, value: u64, cap: usize) {
    ring.push_back(value);
    while ring.len() > cap {
        ring.pop_front();
    }
}

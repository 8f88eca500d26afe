//! [`GlobalPatterns`]: aggregate access frequency across all users.

use std::collections::{HashMap, VecDeque};

/// Cutoff for hour-of-day ring pruning: 24 hours.
pub const HOUR_OF_DAY_CUTOFF_SECS: u64 = 24 * 3600;

/// Cutoff for day-of-week ring pruning: 7 days.
pub const DAY_OF_WEEK_CUTOFF_SECS: u64 = 7 * 24 * 3600;

/// Aggregate frequency tables by resource kind, operation, hour-of-day, and
/// day-of-week, each a bounded time-windowed ring of access timestamps.
#[derive(Debug, Default)]
pub struct GlobalPatterns {
    resource_kind: HashMap<String, VecDeque<u64>>,
    operation: HashMap<String, VecDeque<u64>>,
    hour_of_day: HashMap<u8, VecDeque<u64>>,
    day_of_week: HashMap<u8, VecDeque<u64>>,
}

impl GlobalPatterns {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one access at `now` against every bucket.
    pub fn record(&mut self, now: u64, resource_kind: &str, operation: &str) {
        self.resource_kind
            .entry(resource_kind.to_string())
            .or_default()
            .push_back(now);
        self.operation
            .entry(operation.to_string())
            .or_default()
            .push_back(now);
        self.hour_of_day.entry(hour_of_day(now)).or_default().push_back(now);
        self.day_of_week.entry(day_of_week(now)).or_default().push_back(now);
    }

    /// Returns the number of recorded accesses for `resource_kind`.
    pub fn resource_kind_count(&self, resource_kind: &str) -> usize {
        self.resource_kind
            .get(resource_kind)
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    /// Prunes entries older than `now - cutoff` from every bucket.
    /// Hour-of-day and day-of-week buckets use their own shorter cutoffs
    /// ([`HOUR_OF_DAY_CUTOFF_SECS`], [`DAY_OF_WEEK_CUTOFF_SECS`]) regardless
    /// of `cutoff`, matching spec.
    pub fn prune(&mut self, now: u64, cutoff: u64) {
        prune_buckets(&mut self.resource_kind, now, cutoff);
        prune_buckets(&mut self.operation, now, cutoff);
        prune_buckets(&mut self.hour_of_day, now, HOUR_OF_DAY_CUTOFF_SECS);
        prune_buckets(&mut self.day_of_week, now, DAY_OF_WEEK_CUTOFF_SECS);
    }
}

fn prune_buckets<K: std::hash::Hash + Eq + Clone>(
    buckets: &mut HashMap<K, VecDeque<u64>>,
    now: u64,
    window: u64,
) {
    let threshold = now.saturating_sub(window);
    for ring in buckets.values_mut() {
        while matches!(ring.front(), Some(oldest) if *oldest < threshold) {
            ring.pop_front();
        }
    }
    buckets.retain(|_, ring| !ring.is_empty());
}

fn hour_of_day(unix_timestamp: u64) -> u8 {
    ((unix_timestamp / 3600) % 24) as u8
}

fn day_of_week(unix_timestamp: u64) -> u8 {
    // Unix epoch (1970-01-01) was a Thursday: day index 4 in a Mon=0 week.
    (((unix_timestamp / 86_400) + 3) % 7) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_counted_per_resource_kind() {
        let mut global = GlobalPatterns::new();
        global.record(0, "verdict", "read");
        global.record(10, "verdict", "read");
        global.record(20, "team_membership", "read");

        assert_eq!(global.resource_kind_count("verdict"), 2);
        assert_eq!(global.resource_kind_count("team_membership"), 1);
    }

    #[test]
    fn prune_drops_entries_older_than_cutoff() {
        let mut global = GlobalPatterns::new();
        global.record(0, "verdict", "read");
        global.record(1_000_000, "verdict", "read");

        global.prune(1_000_000, 100);
        assert_eq!(global.resource_kind_count("verdict"), 1);
    }

    #[test]
    fn hour_of_day_bucket_uses_its_own_24h_cutoff() {
        let mut global = GlobalPatterns::new();
        global.record(0, "verdict", "read");
        // 25 hours later; hour-of-day ring should be pruned even with a
        // huge `cutoff` argument that wouldn't prune the other buckets.
        global.prune(25 * 3600, 10 * 365 * 24 * 3600);
        assert_eq!(global.hour_of_day.get(&0).map(VecDeque::len).unwrap_or(0), 0);
    }
}

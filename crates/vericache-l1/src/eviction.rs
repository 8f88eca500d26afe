//! Eviction policies and the HYBRID scoring function.

use crate::entry::CacheEntry;

/// Which eviction policy [`crate::store::L1Store`] uses when it needs to
/// free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict the least-recently-used entry.
    Lru,
    /// Evict the least-frequently-used entry.
    Lfu,
    /// Evict the entry closest to expiry (or without a TTL, treated as
    /// farthest from expiry and evicted last).
    Ttl,
    /// Weighted blend of recency, frequency, and priority. The default.
    #[default]
    Hybrid,
}

/// Computes an entry's eviction score under the given policy. Lower scores
/// are evicted first.
///
/// HYBRID: `0.4 * recency + 0.4 * frequency + 0.2 * priority`, where
/// `recency = 1 / (now - last_access_at + 1)`,
/// `frequency = min(access_count / 100, 1)`, and
/// `priority = priority / 10`.
pub fn score(entry: &CacheEntry, policy: EvictionPolicy, now: u64) -> f64 {
    match policy {
        EvictionPolicy::Lru => recency_component(entry, now),
        EvictionPolicy::Lfu => frequency_component(entry),
        EvictionPolicy::Ttl => match entry.expires_at {
            Some(expires_at) => -(expires_at as f64),
            None => f64::INFINITY,
        },
        EvictionPolicy::Hybrid => {
            0.4 * recency_component(entry, now)
                + 0.4 * frequency_component(entry)
                + 0.2 * priority_component(entry)
        }
    }
}

fn recency_component(entry: &CacheEntry, now: u64) -> f64 {
    let age = now.saturating_sub(entry.last_access_at);
    1.0 / (age as f64 + 1.0)
}

fn frequency_component(entry: &CacheEntry) -> f64 {
    (entry.access_count as f64 / 100.0).min(1.0)
}

fn priority_component(entry: &CacheEntry) -> f64 {
    entry.priority as f64 / 10.0
}

//! The bounded, hybrid-eviction, TTL-aware in-process store.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;

use indexmap::IndexMap;
use vericache_core::{Clock, EventListeners};

use crate::config::L1Config;
use crate::entry::CacheEntry;
use crate::error::L1Error;
use crate::eviction::{self, EvictionPolicy};
use crate::events::L1Event;

/// Fraction of total capacity a single entry may occupy before `Set`
/// rejects it with [`L1Error::RejectedTooLarge`].
const MAX_ENTRY_FRACTION: f64 = 0.10;

struct Inner {
    /// Primary store. Insertion order approximates recency: a `Get` hit
    /// moves its entry to the back via remove-then-reinsert. This is O(n)
    /// worst case, acceptable at L1's bounded size (the same tradeoff the
    /// HYBRID eviction scan already makes).
    entries: IndexMap<String, CacheEntry>,
    tag_index: HashMap<String, HashSet<String>>,
    total_bytes: usize,
}

/// The L1 in-process cache store (component C4).
///
/// All operations acquire a single mutex; the store is sized so that even
/// O(N) hybrid eviction scans stay fast in practice.
pub struct L1Store {
    config: L1Config,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    listeners: EventListeners<L1Event>,
}

/// Result of a `Get`.
pub enum GetResult {
    /// The key was present and unexpired; its payload is returned.
    Hit(Vec<u8>),
    /// The key was absent or expired.
    Miss,
}

impl L1Store {
    /// Creates a new, empty store.
    pub fn new(config: L1Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            inner: Mutex::new(Inner {
                entries: IndexMap::new(),
                tag_index: HashMap::new(),
                total_bytes: 0,
            }),
            listeners: EventListeners::new(),
        }
    }

    /// Registers a listener for hit/miss/eviction events.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: vericache_core::EventListener<L1Event> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Looks up `key`. Expired entries are removed inline and reported as a
    /// miss. On hit, bumps `access_count` and `last_access_at`.
    pub fn get(&self, key: &str) -> GetResult {
        let now = self.clock.unix_now();
        let mut inner = self.inner.lock().expect("l1 mutex poisoned");

        let expired = inner
            .entries
            .get(key)
            .map(|entry| entry.is_expired(now))
            .unwrap_or(false);

        if expired {
            Self::remove_locked(&mut inner, key);
        }

        let result = if let Some(entry) = inner.entries.get_mut(key) {
            entry.access_count += 1;
            entry.last_access_at = now;
            let payload = entry.payload.clone();
            GetResult::Hit(payload)
        } else {
            GetResult::Miss
        };

        if let Some((key, entry)) = inner.entries.shift_remove_entry(key) {
            inner.entries.insert(key, entry);
        }

        self.emit_lookup(key, &result, now);
        result
    }

    /// Inserts or replaces `key`. Rejects payloads larger than 10% of
    /// capacity; otherwise evicts as needed to make room, then inserts.
    #[allow(clippy::too_many_arguments)]
    pub fn set(
        &self,
        key: impl Into<String>,
        payload: Vec<u8>,
        compressed: bool,
        ttl_secs: Option<u64>,
        priority: u8,
        tags: BTreeSet<String>,
    ) -> Result<(), L1Error> {
        let key = key.into();
        let size_bytes = payload.len();
        let max_bytes = (self.config.capacity_bytes as f64 * MAX_ENTRY_FRACTION) as usize;

        if size_bytes > max_bytes {
            return Err(L1Error::RejectedTooLarge {
                size_bytes,
                max_bytes,
            });
        }

        let now = self.clock.unix_now();
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            size_bytes,
            created_at: now,
            expires_at: ttl_secs.map(|ttl| now + ttl),
            last_access_at: now,
            access_count: 0,
            priority,
            tags: tags.clone(),
            compressed,
        };

        let mut inner = self.inner.lock().expect("l1 mutex poisoned");

        if let Some(previous) = inner.entries.get(&key) {
            let freed = previous.size_bytes;
            Self::untag_locked(&mut inner, &key);
            inner.total_bytes -= freed;
        }

        self.ensure_space_locked(&mut inner, size_bytes, now);

        inner.total_bytes += size_bytes;
        for tag in &tags {
            inner
                .tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        inner.entries.insert(key, entry);

        Ok(())
    }

    /// Removes `key` and all its index references, if present.
    pub fn delete(&self, key: &str) {
        let mut inner = self.inner.lock().expect("l1 mutex poisoned");
        Self::remove_locked(&mut inner, key);
    }

    /// Removes every entry tagged with `tag`.
    pub fn delete_by_tag(&self, tag: &str) {
        let mut inner = self.inner.lock().expect("l1 mutex poisoned");
        let keys: Vec<String> = inner
            .tag_index
            .get(tag)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default();

        for key in keys {
            Self::remove_locked(&mut inner, &key);
        }
    }

    /// Removes every entry whose key matches `pattern`. `pattern` supports a
    /// single `*` wildcard, same as L2's server-side scan.
    pub fn delete_by_pattern(&self, pattern: &str) {
        let mut inner = self.inner.lock().expect("l1 mutex poisoned");
        let keys: Vec<String> = inner
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();

        for key in keys {
            Self::remove_locked(&mut inner, &key);
        }
    }

    /// Removes all expired entries in one pass. Intended to run
    /// periodically (spec recommends every 60s or more).
    pub fn sweep(&self) -> usize {
        let now = self.clock.unix_now();
        let mut inner = self.inner.lock().expect("l1 mutex poisoned");

        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            Self::remove_locked(&mut inner, &key);
        }
        count
    }

    /// Returns the number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("l1 mutex poisoned").entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total bytes currently occupied.
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().expect("l1 mutex poisoned").total_bytes
    }

    /// Removes every entry and index, e.g. on facade shutdown.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("l1 mutex poisoned");
        inner.entries.clear();
        inner.tag_index.clear();
        inner.total_bytes = 0;
    }

    fn ensure_space_locked(&self, inner: &mut Inner, required_bytes: usize, now: u64) {
        while inner.total_bytes + required_bytes > self.config.capacity_bytes
            && !inner.entries.is_empty()
        {
            let victim_key = inner
                .entries
                .iter()
                .min_by(|(_, a), (_, b)| {
                    let score_a = eviction::score(a, self.config.eviction_policy, now);
                    let score_b = eviction::score(b, self.config.eviction_policy, now);
                    score_a
                        .partial_cmp(&score_b)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(key, _)| key.clone());

            let Some(victim_key) = victim_key else {
                break;
            };

            Self::remove_locked(inner, &victim_key);

            self.listeners.emit(&L1Event::Eviction {
                store: self.config.store_name.clone(),
                key: victim_key,
                timestamp: self.clock.now(),
            });
        }
    }

    fn remove_locked(inner: &mut Inner, key: &str) {
        if let Some(entry) = inner.entries.shift_remove(key) {
            inner.total_bytes -= entry.size_bytes;
        }
        Self::untag_locked(inner, key);
    }

    fn untag_locked(inner: &mut Inner, key: &str) {
        for keys in inner.tag_index.values_mut() {
            keys.remove(key);
        }
        inner.tag_index.retain(|_, keys| !keys.is_empty());
    }

    fn emit_lookup(&self, key: &str, result: &GetResult, now_unix: u64) {
        let _ = now_unix;
        let event = match result {
            GetResult::Hit(_) => L1Event::Hit {
                store: self.config.store_name.clone(),
                key: key.to_string(),
                timestamp: self.clock.now(),
            },
            GetResult::Miss => L1Event::Miss {
                store: self.config.store_name.clone(),
                key: key.to_string(),
                timestamp: self.clock.now(),
            },
        };
        self.listeners.emit(&event);

        #[cfg(feature = "metrics")]
        {
            let outcome = match result {
                GetResult::Hit(_) => "hit",
                GetResult::Miss => "miss",
            };
            metrics::counter!(
                "vericache_l1_lookups_total",
                "store" => self.config.store_name.clone(),
                "outcome" => outcome
            )
            .increment(1);
        }
    }
}

/// Matches keys by glob-style `*` wildcard, mirroring L2's own `scan` matcher.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((prefix, suffix)) => key.starts_with(prefix) && key.ends_with(suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vericache_core::TestClock;

    fn store(capacity_bytes: usize, policy: EvictionPolicy) -> L1Store {
        let config = L1Config {
            capacity_bytes,
            eviction_policy: policy,
            store_name: "test".to_string(),
        };
        L1Store::new(config, Arc::new(TestClock::default()))
    }

    #[test]
    fn set_then_get_hits() {
        let store = store(1024, EvictionPolicy::Hybrid);
        store
            .set("k1", vec![1, 2, 3], false, None, 5, BTreeSet::new())
            .unwrap();

        match store.get("k1") {
            GetResult::Hit(payload) => assert_eq!(payload, vec![1, 2, 3]),
            GetResult::Miss => panic!("expected hit"),
        }
    }

    #[test]
    fn missing_key_is_a_miss() {
        let store = store(1024, EvictionPolicy::Hybrid);
        assert!(matches!(store.get("absent"), GetResult::Miss));
    }

    #[test]
    fn oversized_entry_is_rejected() {
        let store = store(100, EvictionPolicy::Hybrid);
        let err = store
            .set("big", vec![0u8; 50], false, None, 5, BTreeSet::new())
            .unwrap_err();
        assert!(matches!(err, L1Error::RejectedTooLarge { .. }));
    }

    #[test]
    fn delete_removes_entry() {
        let store = store(1024, EvictionPolicy::Hybrid);
        store
            .set("k1", vec![1], false, None, 5, BTreeSet::new())
            .unwrap();
        store.delete("k1");
        assert!(matches!(store.get("k1"), GetResult::Miss));
    }

    #[test]
    fn delete_by_tag_removes_all_tagged_entries() {
        let store = store(1024, EvictionPolicy::Hybrid);
        let mut tags = BTreeSet::new();
        tags.insert("team:eng".to_string());

        store
            .set("k1", vec![1], false, None, 5, tags.clone())
            .unwrap();
        store.set("k2", vec![2], false, None, 5, tags).unwrap();
        store
            .set("k3", vec![3], false, None, 5, BTreeSet::new())
            .unwrap();

        store.delete_by_tag("team:eng");

        assert!(matches!(store.get("k1"), GetResult::Miss));
        assert!(matches!(store.get("k2"), GetResult::Miss));
        assert!(matches!(store.get("k3"), GetResult::Hit(_)));
    }

    #[test]
    fn delete_by_pattern_removes_only_matching_keys() {
        let store = store(1024, EvictionPolicy::Hybrid);
        store
            .set("auth:generation:u1:g1:media", vec![1], false, None, 5, BTreeSet::new())
            .unwrap();
        store
            .set("auth:generation:u2:g2:media", vec![2], false, None, 5, BTreeSet::new())
            .unwrap();
        store
            .set("auth:team:u1:eng", vec![3], false, None, 5, BTreeSet::new())
            .unwrap();

        store.delete_by_pattern("auth:generation:*");

        assert!(matches!(store.get("auth:generation:u1:g1:media"), GetResult::Miss));
        assert!(matches!(store.get("auth:generation:u2:g2:media"), GetResult::Miss));
        assert!(matches!(store.get("auth:team:u1:eng"), GetResult::Hit(_)));
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let clock = TestClock::new(1_000);
        let config = L1Config {
            capacity_bytes: 1024,
            eviction_policy: EvictionPolicy::Hybrid,
            store_name: "test".to_string(),
        };
        let store = L1Store::new(config, Arc::new(clock.clone()));

        store
            .set("short", vec![1], false, Some(10), 5, BTreeSet::new())
            .unwrap();
        store
            .set("long", vec![2], false, Some(1000), 5, BTreeSet::new())
            .unwrap();

        clock.advance(std::time::Duration::from_secs(20));
        let swept = store.sweep();

        assert_eq!(swept, 1);
        assert!(matches!(store.get("short"), GetResult::Miss));
        assert!(matches!(store.get("long"), GetResult::Hit(_)));
    }

    #[test]
    fn eviction_frees_space_for_a_new_entry() {
        // 10-byte entries must be at most 10% of capacity (MAX_ENTRY_FRACTION),
        // so capacity needs to be at least 100 bytes for a 10-byte `set` to be
        // accepted at all.
        let store = store(100, EvictionPolicy::Hybrid);
        for i in 0..10 {
            store
                .set(format!("k{i}"), vec![0u8; 10], false, None, 1, BTreeSet::new())
                .unwrap();
        }

        // 10 entries of 10 bytes exactly fill the 100-byte capacity; an 11th
        // must evict one of the low-priority ones.
        store
            .set("newcomer", vec![0u8; 10], false, None, 10, BTreeSet::new())
            .unwrap();

        assert!(store.total_bytes() <= 100);
        assert!(matches!(store.get("newcomer"), GetResult::Hit(_)));
    }
}

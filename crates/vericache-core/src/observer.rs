//! [`CacheObserver`]: the seam the cache manager and facade report tier
//! outcomes through, so the performance monitor (C13) can be wired in after
//! construction without the manager owning a dependency on it.

/// Receives per-call outcomes from the cache manager and facade. The
/// performance monitor is the canonical implementor; `CacheManager::wire_observer`
/// and the facade's own instrumentation call these hooks inline, never on a
/// background task, so latency is measured at the call site.
pub trait CacheObserver: Send + Sync {
    /// Reports one L1 lookup's outcome.
    fn observe_l1(&self, hit: bool, latency_ms: u64);

    /// Reports one L2 lookup's outcome, including whether the breaker was
    /// open at the time.
    fn observe_l2(&self, hit: bool, latency_ms: u64, breaker_open: bool);

    /// Reports one L3 lookup's latency.
    fn observe_l3(&self, latency_ms: u64);

    /// Reports one authorization facade call's end-to-end latency.
    fn observe_facade(&self, latency_ms: u64);
}

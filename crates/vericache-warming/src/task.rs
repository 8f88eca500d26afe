//! [`WarmingTask`]: one unit of warming work, ordered priority-then-FIFO.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use vericache_manager::FetcherId;

/// Task priority, lowest number served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Highest priority: served before everything else.
    Critical = 1,
    /// Above-default priority.
    High = 2,
    /// Default priority.
    Medium = 3,
    /// Below-default priority.
    Low = 4,
    /// Lowest priority: served only when nothing else is queued.
    Background = 5,
}

impl Priority {
    /// All five levels, in ascending (highest-first) order.
    pub const ALL: [Priority; 5] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Background,
    ];
}

/// Which strategy produced a [`WarmingTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Run once at orchestrator start.
    Startup,
    /// Periodic, driven by predicted next-access times.
    Predictive,
    /// Caller-enqueued, e.g. after a cache miss storm.
    Reactive,
    /// Driven by the cache manager's background trigger.
    Scheduled,
    /// Triggered by the monitor reporting a hit-rate recovery need.
    BurstRecovery,
}

/// One unit of warming work: fetch `cache_key` and populate the cache.
#[derive(Debug, Clone)]
pub struct WarmingTask {
    /// Unique identifier for this task.
    pub task_id: String,
    /// Scheduling priority.
    pub priority: Priority,
    /// The strategy that produced this task.
    pub strategy: Strategy,
    /// The kind of key being warmed, e.g. `"verdict"`.
    pub key_type: String,
    /// The cache key to populate.
    pub cache_key: String,
    /// Identifies the registered `FetchFn` to invoke on a miss.
    pub fetcher_ref: FetcherId,
    /// Estimated execution time in milliseconds, for scheduling heuristics.
    pub est_exec_ms: u64,
    /// Estimated payload size in bytes, for scheduling heuristics.
    pub est_bytes: u64,
    /// Unix timestamp this task was created. Breaks priority ties, FIFO.
    pub created_at: u64,
    /// Unix timestamp this task was popped for execution, if any.
    pub scheduled_at: Option<u64>,
    /// Unix timestamp this task finished, if any.
    pub completed_at: Option<u64>,
    /// Whether the task ultimately succeeded.
    pub success: bool,
    /// Wall-clock execution time in milliseconds, once completed.
    pub execution_ms: Option<u64>,
    /// Caller-supplied tags, carried through for invalidation/metrics.
    pub tags: Vec<String>,
    /// Free-form metadata.
    pub metadata: BTreeMap<String, String>,
}

impl WarmingTask {
    /// Creates a new, not-yet-scheduled task.
    pub fn new(
        task_id: impl Into<String>,
        priority: Priority,
        strategy: Strategy,
        key_type: impl Into<String>,
        cache_key: impl Into<String>,
        fetcher_ref: impl Into<FetcherId>,
        created_at: u64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            priority,
            strategy,
            key_type: key_type.into(),
            cache_key: cache_key.into(),
            fetcher_ref: fetcher_ref.into(),
            est_exec_ms: 0,
            est_bytes: 0,
            created_at,
            scheduled_at: None,
            completed_at: None,
            success: false,
            execution_ms: None,
            tags: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

impl PartialEq for WarmingTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.created_at == other.created_at
    }
}

impl Eq for WarmingTask {}

impl PartialOrd for WarmingTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WarmingTask {
    /// Orders `(priority asc, created_at asc)`: a task is "less than" another
    /// if it should be popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

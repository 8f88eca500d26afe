//! [`WarmingOrchestrator`] (component C11): composes the five warming
//! strategies, each producing a batch of [`WarmingTask`]s for C9.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use vericache_core::Clock;
use vericache_l3::{Filter, ProjectionReader};
use vericache_learner::AccessPatternLearner;
use vericache_manager::WarmTrigger;

use crate::config::WarmingConfig;
use crate::error::QueueFull;
use crate::queue::PriorityWarmingQueue;
use crate::task::{Priority, Strategy, WarmingTask};

/// The L3 projections the startup strategy enumerates from, paired with the
/// `key_type` and fetcher used for the tasks each one produces.
const STARTUP_PROJECTIONS: &[(&str, &str)] = &[
    ("recently_active_users", "session"),
    ("recent_completed_generations", "generation_metadata"),
    ("active_teams", "team_membership"),
];

/// Composes the startup, predictive, scheduled, reactive, and burst-recovery
/// warming strategies over a shared [`PriorityWarmingQueue`].
pub struct WarmingOrchestrator {
    config: WarmingConfig,
    queue: Arc<PriorityWarmingQueue>,
    learner: Arc<AccessPatternLearner>,
    l3: Arc<ProjectionReader>,
    clock: Arc<dyn Clock>,
    next_task_id: AtomicU64,
}

impl WarmingOrchestrator {
    /// Creates a new orchestrator over `queue`.
    pub fn new(
        config: WarmingConfig,
        queue: Arc<PriorityWarmingQueue>,
        learner: Arc<AccessPatternLearner>,
        l3: Arc<ProjectionReader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            queue,
            learner,
            l3,
            clock,
            next_task_id: AtomicU64::new(0),
        }
    }

    /// Runs once on startup: enumerates recently active users, recent
    /// completed generations, and active teams from L3, enqueuing
    /// CRITICAL/HIGH tasks for their session, metadata, and authorization
    /// verdicts. Missing projections are skipped, not fatal.
    pub async fn run_startup(&self) {
        for (projection, key_type) in STARTUP_PROJECTIONS {
            let rows = match self
                .l3
                .fetch_projection(projection, &Filter::any(), self.config.startup_enumeration_limit)
                .await
            {
                Ok(rows) => rows,
                Err(_unregistered) => continue,
            };

            for row in rows {
                self.enqueue(
                    Priority::Critical,
                    Strategy::Startup,
                    key_type,
                    &row.key,
                    key_type,
                    Vec::new(),
                );
            }
        }
    }

    /// Runs one predictive pass: for every user whose predicted next access
    /// falls within `predictive_lookahead`, enqueues LOW-priority tasks for
    /// resource kinds above `predictive_probability_threshold`.
    pub fn run_predictive(&self) {
        let now = self.clock.unix_now();
        let horizon = now + self.config.predictive_lookahead.as_secs();

        for user in self.learner.users() {
            let Some(next_access) = self.learner.next_access_time(&user) else {
                continue;
            };
            if next_access > horizon {
                continue;
            }

            for (kind, probability) in self.learner.likely_resources(&user, 10) {
                if probability < self.config.predictive_probability_threshold {
                    continue;
                }
                let cache_key = format!("auth:{kind}:{user}");
                let _ = self.enqueue(Priority::Low, Strategy::Predictive, &kind, &cache_key, &kind, Vec::new());
            }
        }
    }

    /// Runs one scheduled pass over the default pattern set, as driven by
    /// the cache manager's background trigger.
    pub fn run_scheduled(&self) {
        for key_type in self.config.scheduled_pattern_set.clone() {
            let cache_key = format!("auth:{key_type}:default");
            let _ = self.enqueue(Priority::Medium, Strategy::Scheduled, &key_type, &cache_key, &key_type, Vec::new());
        }
    }

    /// Enqueues a caller-supplied reactive task, e.g. after a cache miss
    /// storm. Priority and fetcher are caller-chosen.
    pub fn enqueue_reactive(
        &self,
        priority: Priority,
        key_type: &str,
        cache_key: &str,
        fetcher_ref: &str,
        tags: Vec<String>,
    ) -> Result<(), QueueFull> {
        self.enqueue(priority, Strategy::Reactive, key_type, cache_key, fetcher_ref, tags)
    }

    /// Runs a burst-recovery pass over `hottest_keys`, called when the
    /// monitor reports aggregate hit rate below its recovery threshold.
    pub fn run_burst_recovery(&self, key_type: &str, fetcher_ref: &str, hottest_keys: &[String]) {
        for key in hottest_keys {
            let _ = self.enqueue(Priority::Medium, Strategy::BurstRecovery, key_type, key, fetcher_ref, Vec::new());
        }
    }

    fn enqueue(
        &self,
        priority: Priority,
        strategy: Strategy,
        key_type: &str,
        cache_key: &str,
        fetcher_ref: &str,
        tags: Vec<String>,
    ) -> Result<(), QueueFull> {
        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let mut task = WarmingTask::new(
            format!("warm-{id}"),
            priority,
            strategy,
            key_type,
            cache_key,
            fetcher_ref.to_string(),
            self.clock.unix_now(),
        );
        task.tags = tags;
        self.queue.push(task)
    }
}

/// The scheduled strategy is exposed as a [`WarmTrigger`] so the cache
/// manager's background timer can drive it without owning a dependency on
/// this crate.
#[async_trait]
impl WarmTrigger for WarmingOrchestrator {
    async fn trigger_default_warming(&self) {
        self.run_scheduled();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vericache_core::TestClock;
    use vericache_l3::{ProjectionRow, StaticProjectionSource};

    fn orchestrator() -> (WarmingOrchestrator, Arc<PriorityWarmingQueue>, TestClock) {
        let clock = TestClock::default();
        let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
        let queue = Arc::new(PriorityWarmingQueue::new(100));
        let learner = Arc::new(AccessPatternLearner::new(Arc::clone(&clock_arc)));
        let l3 = Arc::new(ProjectionReader::new());

        let orchestrator = WarmingOrchestrator::new(
            WarmingConfig::default(),
            Arc::clone(&queue),
            learner,
            l3,
            clock_arc,
        );
        (orchestrator, queue, clock)
    }

    #[tokio::test]
    async fn startup_enumerates_registered_projections_as_critical_tasks() {
        let clock = TestClock::default();
        let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
        let queue = Arc::new(PriorityWarmingQueue::new(100));
        let learner = Arc::new(AccessPatternLearner::new(Arc::clone(&clock_arc)));

        let mut l3 = ProjectionReader::new();
        l3.register(
            "recently_active_users",
            Arc::new(StaticProjectionSource::new(vec![ProjectionRow {
                key: "user-1".to_string(),
                payload: Vec::new(),
                attributes: BTreeMap::new(),
            }])),
        );

        let orchestrator = WarmingOrchestrator::new(
            WarmingConfig::default(),
            Arc::clone(&queue),
            learner,
            Arc::new(l3),
            clock_arc,
        );

        orchestrator.run_startup().await;

        let task = queue.pop().expect("a task was enqueued");
        assert_eq!(task.priority, Priority::Critical);
        assert_eq!(task.strategy, Strategy::Startup);
        assert_eq!(task.cache_key, "user-1");
    }

    #[tokio::test]
    async fn unregistered_projections_are_skipped_without_failing() {
        let (orchestrator, queue, _clock) = orchestrator();
        orchestrator.run_startup().await;
        assert_eq!(queue.size(None), 0);
    }

    #[test]
    fn predictive_enqueues_low_priority_tasks_above_threshold() {
        let (orchestrator, queue, clock) = orchestrator();
        for _ in 0..5 {
            orchestrator
                .learner
                .record_access("u1", "verdict", "read", "s1");
            clock.advance(std::time::Duration::from_secs(60));
        }

        orchestrator.run_predictive();

        let task = queue.pop().expect("a predictive task was enqueued");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.strategy, Strategy::Predictive);
    }

    #[test]
    fn reactive_enqueue_respects_caller_supplied_priority() {
        let (orchestrator, queue, _clock) = orchestrator();
        orchestrator
            .enqueue_reactive(Priority::Critical, "verdict", "k1", "echo", vec!["tag1".to_string()])
            .unwrap();

        let task = queue.pop().unwrap();
        assert_eq!(task.priority, Priority::Critical);
        assert_eq!(task.strategy, Strategy::Reactive);
        assert_eq!(task.tags, vec!["tag1".to_string()]);
    }

    #[test]
    fn burst_recovery_enqueues_medium_priority_tasks_over_hot_keys() {
        let (orchestrator, queue, _clock) = orchestrator();
        orchestrator.run_burst_recovery("verdict", "echo", &["k1".to_string(), "k2".to_string()]);

        assert_eq!(queue.size(Some(Priority::Medium)), 2);
    }

    #[tokio::test]
    async fn warm_trigger_impl_runs_the_scheduled_strategy() {
        let (orchestrator, queue, _clock) = orchestrator();
        orchestrator.trigger_default_warming().await;

        let task = queue.pop().expect("scheduled task was enqueued");
        assert_eq!(task.strategy, Strategy::Scheduled);
    }
}

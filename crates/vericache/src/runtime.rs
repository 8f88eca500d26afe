//! [`CacheRuntime`]: builds every component, performs the two-phase wiring
//! the "Cyclic structure" design note calls for, and owns the background
//! tasks' lifecycle.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use vericache_core::{CacheObserver, Clock};
use vericache_l1::L1Store;
use vericache_l2::{L2Adapter, RemoteBackend};
use vericache_l3::ProjectionReader;
use vericache_learner::AccessPatternLearner;
use vericache_manager::{CacheManager, FetcherRegistry, HealthReport, WarmTrigger};
use vericache_monitor::PerformanceMonitor;
use vericache_warming::{
    HitRateSource, PriorityWarmingQueue, WarmingOrchestrator, WarmingWorkerPool,
};

use crate::config::CacheRuntimeConfig;
use crate::facade::AuthorizationCacheFacade;

/// Everything a running vericache instance needs: every tier, the
/// background loops that keep them warm and observed, and the facade
/// callers actually talk to.
///
/// Construction is two-phase. Components that would otherwise need a
/// reference cycle (the manager reporting to the monitor, the manager
/// triggering the warming orchestrator, the warming pool throttling on the
/// monitor's hit rate) are built independently of one another, then wired
/// together once every `Arc` exists. See the "Cyclic structure" design
/// note.
pub struct CacheRuntime {
    l1: Arc<L1Store>,
    manager: Arc<CacheManager>,
    learner: Arc<AccessPatternLearner>,
    monitor: Arc<PerformanceMonitor>,
    queue: Arc<PriorityWarmingQueue>,
    pool: Arc<WarmingWorkerPool>,
    orchestrator: Arc<WarmingOrchestrator>,
    facade: Arc<AuthorizationCacheFacade>,
    config: CacheRuntimeConfig,
    clock: Arc<dyn Clock>,
    cancellation: CancellationToken,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl CacheRuntime {
    /// Builds every component and wires the post-construction seams. Does
    /// not start any background task; call [`CacheRuntime::start`] for that.
    pub fn new(
        config: CacheRuntimeConfig,
        backend: Arc<dyn RemoteBackend>,
        l3: ProjectionReader,
        fetchers: FetcherRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let l1 = Arc::new(L1Store::new(config.l1.clone(), Arc::clone(&clock)));
        let l2 = Arc::new(L2Adapter::new(config.l2.clone(), backend, Arc::clone(&clock)));
        let l3 = Arc::new(l3);
        let fetchers = Arc::new(fetchers);

        let manager = Arc::new(CacheManager::new(
            Arc::clone(&l1),
            l2,
            Arc::clone(&l3),
            Arc::clone(&clock),
            config.manager.clone(),
        ));

        let learner = Arc::new(AccessPatternLearner::new(Arc::clone(&clock)));
        config.apply_learner_defaults(&learner);

        let monitor = Arc::new(PerformanceMonitor::new(config.monitor.clone(), Arc::clone(&clock)));

        let queue = Arc::new(PriorityWarmingQueue::new(config.warming.queue_capacity_per_priority));
        let orchestrator = Arc::new(WarmingOrchestrator::new(
            config.warming.clone(),
            Arc::clone(&queue),
            Arc::clone(&learner),
            Arc::clone(&l3),
            Arc::clone(&clock),
        ));
        let pool = Arc::new(WarmingWorkerPool::new(
            config.warming.clone(),
            Arc::clone(&queue),
            Arc::clone(&manager),
            fetchers,
            Arc::clone(&clock),
        ));

        manager.wire_warm_trigger(Arc::clone(&orchestrator) as Arc<dyn WarmTrigger>);
        manager.wire_observer(Arc::clone(&monitor) as Arc<dyn CacheObserver>);
        pool.wire_hit_rate_source(Arc::clone(&monitor) as Arc<dyn HitRateSource>);

        let facade = Arc::new(AuthorizationCacheFacade::new(
            Arc::clone(&manager),
            Arc::clone(&learner),
            Arc::clone(&monitor) as Arc<dyn CacheObserver>,
            Arc::clone(&clock),
        ));

        Self {
            l1,
            manager,
            learner,
            monitor,
            queue,
            pool,
            orchestrator,
            facade,
            config,
            clock,
            cancellation: CancellationToken::new(),
            tasks: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// The domain-shaped facade callers resolve authorization through.
    pub fn facade(&self) -> Arc<AuthorizationCacheFacade> {
        Arc::clone(&self.facade)
    }

    /// The performance monitor, for callers that want trend reports or
    /// recommendations directly.
    pub fn monitor(&self) -> Arc<PerformanceMonitor> {
        Arc::clone(&self.monitor)
    }

    /// The access pattern learner, for callers that feed it access events
    /// from outside the facade's own read path.
    pub fn learner(&self) -> Arc<AccessPatternLearner> {
        Arc::clone(&self.learner)
    }

    /// Runs the startup warming strategy once, then spawns the sweeper,
    /// warmer-trigger, worker pool, monitor sampler, pattern pruner, and (if
    /// enabled) predictive warming loops as background tasks.
    pub async fn start(&self) {
        self.orchestrator.run_startup().await;

        let mut tasks = self.tasks.lock().expect("runtime tasks lock poisoned");

        tasks.push(spawn_sweeper(Arc::clone(&self.manager), self.cancellation.clone()));
        tasks.push(spawn_warmer_trigger(Arc::clone(&self.manager), self.cancellation.clone()));
        tasks.push(spawn_pool(Arc::clone(&self.pool), self.cancellation.clone()));
        tasks.push(spawn_sampler(Arc::clone(&self.monitor), self.cancellation.clone()));
        tasks.push(spawn_pruner(
            Arc::clone(&self.learner),
            self.config.pruner_interval,
            self.config.pruner_cutoff,
            self.cancellation.clone(),
        ));

        if self.config.predictive_warming_enabled {
            tasks.push(spawn_predictive(
                Arc::clone(&self.orchestrator),
                self.config.warming.predictive_interval,
                self.cancellation.clone(),
            ));
        }
    }

    /// Runs the scheduled warming strategy once, outside of the manager's
    /// own background trigger schedule.
    pub async fn warm_frequent(&self) {
        self.facade.warm_frequent().await;
    }

    /// Reports per-tier and overall availability.
    pub async fn health(&self) -> HealthReport {
        self.manager.health().await
    }

    /// Runs a burst-recovery pass over the caller-identified hottest keys.
    /// vericache has no internal notion of "hottest keys" across a burst;
    /// the integrating process is expected to derive this list from its own
    /// access logs.
    pub fn warm_burst_recovery(&self, key_type: &str, fetcher_ref: &str, hottest_keys: &[String]) {
        self.orchestrator.run_burst_recovery(key_type, fetcher_ref, hottest_keys);
    }

    /// Cancels every background task, awaits their drain within
    /// `shutdown_deadline`, then clears L1. Idempotent.
    pub async fn stop(&self) {
        self.cancellation.cancel();

        let handles = {
            let mut tasks = self.tasks.lock().expect("runtime tasks lock poisoned");
            std::mem::take(&mut *tasks)
        };

        let drain = futures::future::join_all(handles);
        if tokio::time::timeout(self.config.shutdown_deadline, drain).await.is_err() {
            // Background tasks did not drain within the deadline; they are
            // abandoned rather than awaited further. L1 is still cleared
            // below so a restarted runtime starts from a clean slate.
        }

        self.l1.clear();
    }

    /// The clock this runtime was constructed with, for callers that want
    /// to stamp their own events consistently with the runtime's notion of
    /// "now".
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

fn spawn_sweeper(manager: Arc<CacheManager>, cancellation: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move { manager.run_sweeper(cancellation).await })
}

fn spawn_warmer_trigger(manager: Arc<CacheManager>, cancellation: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move { manager.run_warmer_trigger(cancellation).await })
}

fn spawn_pool(pool: Arc<WarmingWorkerPool>, cancellation: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move { pool.run(cancellation).await })
}

fn spawn_sampler(monitor: Arc<PerformanceMonitor>, cancellation: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move { monitor.run_sampler(cancellation).await })
}

fn spawn_pruner(
    learner: Arc<AccessPatternLearner>,
    interval: std::time::Duration,
    cutoff: std::time::Duration,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move { learner.run_pruner(interval, cutoff, cancellation).await })
}

fn spawn_predictive(
    orchestrator: Arc<WarmingOrchestrator>,
    interval: std::time::Duration,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = ticker.tick() => {
                    orchestrator.run_predictive();
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use vericache_core::TestClock;
    use vericache_l2::InMemoryRemote;
    use vericache_l3::{ProjectionRow, StaticProjectionSource};

    fn runtime() -> (CacheRuntime, TestClock) {
        let clock = TestClock::default();
        let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
        let backend = Arc::new(InMemoryRemote::new({
            let clock = clock.clone();
            move || clock.unix_now()
        }));

        let mut l3 = ProjectionReader::new();
        l3.register(
            "recently_active_users",
            Arc::new(StaticProjectionSource::new(Vec::<ProjectionRow>::new())),
        );

        let runtime = CacheRuntime::new(
            CacheRuntimeConfig::default(),
            backend,
            l3,
            FetcherRegistry::new(),
            clock_arc,
        );
        (runtime, clock)
    }

    #[tokio::test]
    async fn facade_resolves_through_a_freshly_built_runtime() {
        let (runtime, _clock) = runtime();
        let facade = runtime.facade();

        facade
            .resolve_media_access("gen-1", "user-1", None)
            .await
            .unwrap();
        facade.invalidate_user("user-1").await;
    }

    #[tokio::test]
    async fn start_runs_startup_warming_then_stop_drains_cleanly() {
        let (runtime, _clock) = runtime();
        runtime.start().await;
        runtime.stop().await;
    }

    #[tokio::test]
    async fn warm_frequent_and_burst_recovery_do_not_panic_before_start() {
        let (runtime, _clock) = runtime();
        runtime.warm_frequent().await;
        runtime.warm_burst_recovery("generation_access", "echo", &["k1".to_string()]);
    }

    #[tokio::test]
    async fn health_is_ok_on_a_freshly_built_runtime() {
        let (runtime, _clock) = runtime();
        let report = runtime.health().await;
        assert!(report.overall_ok);
    }

    #[tokio::test]
    async fn monitor_reports_latency_after_a_facade_call() {
        let (runtime, _clock) = runtime();
        runtime
            .facade()
            .resolve_direct_ownership("owner-1", "user-1", "ctx", None)
            .await
            .unwrap();

        let snapshot = runtime.monitor().sample();
        assert_eq!(snapshot.facade.calls, 1);
    }
}

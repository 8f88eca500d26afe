//! [`WarmingWorkerPool`] (component C10): drains the priority queue in
//! batches, respecting throttling and cooperative cancellation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio_util::sync::CancellationToken;

use vericache_core::Clock;
use vericache_manager::{CacheManager, FetchContext, FetcherRegistry};

use crate::config::WarmingConfig;
use crate::queue::PriorityWarmingQueue;
use crate::task::WarmingTask;

/// Reports the manager's current aggregate hit rate, so the pool can
/// throttle without depending directly on the monitor crate. Wired in after
/// construction, same two-phase pattern as `vericache_manager::WarmTrigger`.
pub trait HitRateSource: Send + Sync {
    /// Returns the aggregate hit rate across all tiers, in `[0.0, 1.0]`.
    fn aggregate_hit_rate(&self) -> f64;
}

/// The recorded result of one task's execution.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// The task's identifier.
    pub task_id: String,
    /// Whether the task succeeded.
    pub success: bool,
    /// Wall-clock execution time in milliseconds.
    pub execution_ms: u64,
    /// Size of the value populated, in bytes (0 on failure or cache-hit
    /// short-circuit).
    pub bytes: u64,
}

/// A fixed-size cooperative pool draining a [`PriorityWarmingQueue`] in
/// batches.
pub struct WarmingWorkerPool {
    config: WarmingConfig,
    queue: Arc<PriorityWarmingQueue>,
    manager: Arc<CacheManager>,
    registry: Arc<FetcherRegistry>,
    clock: Arc<dyn Clock>,
    active_tasks: AtomicUsize,
    hit_rate_source: RwLock<Option<Arc<dyn HitRateSource>>>,
    completions: Mutex<VecDeque<TaskOutcome>>,
}

impl WarmingWorkerPool {
    /// Creates a new pool over `queue`, executing tasks against `manager`.
    pub fn new(
        config: WarmingConfig,
        queue: Arc<PriorityWarmingQueue>,
        manager: Arc<CacheManager>,
        registry: Arc<FetcherRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            queue,
            manager,
            registry,
            clock,
            active_tasks: AtomicUsize::new(0),
            hit_rate_source: RwLock::new(None),
            completions: Mutex::new(VecDeque::new()),
        }
    }

    /// Wires a hit-rate source in after construction.
    pub fn wire_hit_rate_source(&self, source: Arc<dyn HitRateSource>) {
        *self.hit_rate_source.write().expect("hit rate source lock poisoned") = Some(source);
    }

    /// Number of tasks currently executing.
    pub fn active_tasks(&self) -> usize {
        self.active_tasks.load(Ordering::Acquire)
    }

    /// A snapshot of the bounded completion ring, oldest first.
    pub fn completions(&self) -> Vec<TaskOutcome> {
        self.completions
            .lock()
            .expect("completions mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Drains the queue until `cancellation` fires. Workers finish their
    /// current batch and exit; queued tasks are left abandoned.
    pub async fn run(&self, cancellation: CancellationToken) {
        loop {
            if cancellation.is_cancelled() {
                return;
            }

            if self.is_throttled() {
                tokio::select! {
                    _ = cancellation.cancelled() => return,
                    _ = tokio::time::sleep(self.config.throttle_poll_interval) => {}
                }
                continue;
            }

            let batch = self.pop_batch();
            if batch.is_empty() {
                tokio::select! {
                    _ = cancellation.cancelled() => return,
                    _ = tokio::time::sleep(self.config.throttle_poll_interval) => {}
                }
                continue;
            }

            let futures = batch.into_iter().map(|task| self.execute_task(task));
            futures::future::join_all(futures).await;
        }
    }

    fn is_throttled(&self) -> bool {
        if self.active_tasks() >= self.config.pool_size {
            return true;
        }
        if let Some(source) = self
            .hit_rate_source
            .read()
            .expect("hit rate source lock poisoned")
            .as_ref()
        {
            if source.aggregate_hit_rate() >= self.config.excellent_hit_rate_threshold {
                return true;
            }
        }
        false
    }

    fn pop_batch(&self) -> Vec<WarmingTask> {
        let batch_size = self.config.batch_size.min(self.config.batch_max);
        let mut batch = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            match self.queue.pop() {
                Some(task) => batch.push(task),
                None => break,
            }
        }
        batch
    }

    async fn execute_task(&self, mut task: WarmingTask) {
        self.active_tasks.fetch_add(1, Ordering::AcqRel);
        let started = self.clock.now();
        task.scheduled_at = Some(self.clock.unix_now());

        let (success, bytes) = self.run_task_body(&task).await;

        let execution_ms = self.clock.now().duration_since(started).as_millis() as u64;
        task.completed_at = Some(self.clock.unix_now());
        task.success = success;
        task.execution_ms = Some(execution_ms);

        self.record_completion(TaskOutcome {
            task_id: task.task_id.clone(),
            success,
            execution_ms,
            bytes,
        });

        self.active_tasks.fetch_sub(1, Ordering::AcqRel);
    }

    async fn run_task_body(&self, task: &WarmingTask) -> (bool, u64) {
        match self.manager.get(&task.cache_key, &task.key_type, None).await {
            Ok((Some(payload), _source)) => return (true, payload.len() as u64),
            Ok((None, _source)) => {}
            Err(_) => {}
        }

        let Some(fetcher) = self.registry.get(&task.fetcher_ref) else {
            return (false, 0);
        };

        let ctx = FetchContext {
            key: task.cache_key.clone(),
            key_type: task.key_type.clone(),
        };

        let value = match fetcher.call(&ctx).await {
            Ok(Some(value)) => value,
            Ok(None) | Err(_) => return (false, 0),
        };

        let bytes = value.len() as u64;
        let (l1_ttl, l2_ttl) = self.config.ttl_for_key_type(&task.key_type);
        let result = self
            .manager
            .set(
                &task.cache_key,
                value,
                Some(l1_ttl),
                Some(l2_ttl),
                task.priority as u8,
                task.tags.iter().cloned().collect(),
            )
            .await;

        (result.l1_ok || result.l2_ok, bytes)
    }

    fn record_completion(&self, outcome: TaskOutcome) {
        let mut completions = self.completions.lock().expect("completions mutex poisoned");
        completions.push_back(outcome);
        while completions.len() > self.config.completion_ring_capacity {
            completions.pop_front();
        }
    }
}

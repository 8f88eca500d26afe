//! Priority warming queue, worker pool, and orchestrator (components C9,
//! C10, C11): predictive and reactive cache warming atop the cache manager.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pool;
pub mod queue;
pub mod task;

pub use config::WarmingConfig;
pub use error::QueueFull;
pub use orchestrator::WarmingOrchestrator;
pub use pool::{HitRateSource, TaskOutcome, WarmingWorkerPool};
pub use queue::PriorityWarmingQueue;
pub use task::{Priority, Strategy, WarmingTask};

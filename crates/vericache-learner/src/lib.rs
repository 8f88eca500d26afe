//! Per-user and global access-pattern learning for vericache's predictive
//! warming (component C8).

pub mod global;
pub mod learner;
pub mod pattern;

pub use global::GlobalPatterns;
pub use learner::{AccessPatternLearner, DEFAULT_PRUNE_CUTOFF_SECS};
pub use pattern::AccessPatternRecord;

//! [`PriorityWarmingQueue`] (component C9): five FIFO-within-priority
//! sub-queues exposed as a single priority heap.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::QueueFull;
use crate::task::{Priority, WarmingTask};

/// Five FIFO-within-priority queues, popped in `(priority asc, created_at
/// asc)` order. Pushing past a priority's capacity rejects with
/// [`QueueFull`] rather than blocking or evicting.
pub struct PriorityWarmingQueue {
    capacity_per_priority: usize,
    lanes: Mutex<[VecDeque<WarmingTask>; 5]>,
}

impl PriorityWarmingQueue {
    /// Creates an empty queue with `capacity_per_priority` slots in each of
    /// the five priority lanes.
    pub fn new(capacity_per_priority: usize) -> Self {
        Self {
            capacity_per_priority,
            lanes: Mutex::new(Default::default()),
        }
    }

    /// Pushes `task` onto its priority's lane. Rejects with [`QueueFull`] if
    /// that lane is already at capacity.
    pub fn push(&self, task: WarmingTask) -> Result<(), QueueFull> {
        let mut lanes = self.lanes.lock().expect("warming queue mutex poisoned");
        let lane = &mut lanes[lane_index(task.priority)];
        if lane.len() >= self.capacity_per_priority {
            return Err(QueueFull {
                priority: task.priority,
                capacity: self.capacity_per_priority,
            });
        }
        lane.push_back(task);
        Ok(())
    }

    /// Pops the highest-priority, oldest task, or `None` if every lane is
    /// empty.
    pub fn pop(&self) -> Option<WarmingTask> {
        let mut lanes = self.lanes.lock().expect("warming queue mutex poisoned");
        for lane in lanes.iter_mut() {
            if let Some(task) = lane.pop_front() {
                return Some(task);
            }
        }
        None
    }

    /// Returns the number of queued tasks at `priority`, or the total across
    /// all lanes if `priority` is `None`.
    pub fn size(&self, priority: Option<Priority>) -> usize {
        let lanes = self.lanes.lock().expect("warming queue mutex poisoned");
        match priority {
            Some(priority) => lanes[lane_index(priority)].len(),
            None => lanes.iter().map(VecDeque::len).sum(),
        }
    }
}

fn lane_index(priority: Priority) -> usize {
    priority as usize - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Strategy;

    fn task(priority: Priority, created_at: u64) -> WarmingTask {
        WarmingTask::new("t", priority, Strategy::Reactive, "verdict", "k", "echo", created_at)
    }

    #[test]
    fn pop_order_is_priority_then_fifo() {
        let queue = PriorityWarmingQueue::new(10);
        queue.push(task(Priority::Low, 0)).unwrap();
        queue.push(task(Priority::Critical, 5)).unwrap();
        queue.push(task(Priority::Critical, 1)).unwrap();

        assert_eq!(queue.pop().unwrap().created_at, 1);
        assert_eq!(queue.pop().unwrap().created_at, 5);
        assert_eq!(queue.pop().unwrap().priority, Priority::Low);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn push_past_capacity_rejects_with_queue_full() {
        let queue = PriorityWarmingQueue::new(1);
        queue.push(task(Priority::Medium, 0)).unwrap();
        let err = queue.push(task(Priority::Medium, 1)).unwrap_err();
        assert_eq!(err.priority, Priority::Medium);
        assert_eq!(err.capacity, 1);
    }

    #[test]
    fn size_reports_per_priority_and_total() {
        let queue = PriorityWarmingQueue::new(10);
        queue.push(task(Priority::High, 0)).unwrap();
        queue.push(task(Priority::High, 1)).unwrap();
        queue.push(task(Priority::Low, 0)).unwrap();

        assert_eq!(queue.size(Some(Priority::High)), 2);
        assert_eq!(queue.size(Some(Priority::Low)), 1);
        assert_eq!(queue.size(None), 3);
    }
}

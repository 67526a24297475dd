//! Priority-banded FIFO task queue: `Critical` tasks always dequeue before
//! `High`, before `Normal`, before `Low`; tasks within the same band dequeue
//! in submission order.
//!
//! Grounded on `submit_task`'s priority-insertion logic in
//! `original_source/orchestrator.py`, reshaped into Rust's idiomatic
//! `BTreeMap<Priority, VecDeque<Task>>` rather than the source's
//! linear-scan-and-insert list.

use miq_core::error::OrchestratorError;
use miq_core::types::{Priority, Task, TaskStatus};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Default)]
pub struct PriorityTaskQueue {
    bands: BTreeMap<Priority, VecDeque<Task>>,
}

impl PriorityTaskQueue {
    pub fn new() -> Self {
        Self { bands: BTreeMap::new() }
    }

    pub fn push(&mut self, task: Task) {
        self.bands.entry(task.priority).or_default().push_back(task);
    }

    /// Pop the next task in priority order, `Critical` first.
    pub fn pop(&mut self) -> Option<Task> {
        for band in self.bands.values_mut() {
            if let Some(task) = band.pop_front() {
                return Some(task);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.bands.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a still-pending task from the queue. Returns an error if the
    /// task isn't present (either unknown or already dequeued for running).
    pub fn cancel(&mut self, task_id: &str) -> Result<Task, OrchestratorError> {
        for band in self.bands.values_mut() {
            if let Some(pos) = band.iter().position(|t| t.id == task_id) {
                let mut task = band.remove(pos).expect("position just located");
                task.status = TaskStatus::Cancelled;
                return Ok(task);
            }
        }
        Err(OrchestratorError::TaskNotFound { id: task_id.to_string() })
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.bands.values().flat_map(|band| band.iter().map(|t| t.id.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miq_core::types::{AgentKey, TaskInput};

    fn task(priority: Priority) -> Task {
        Task::new(AgentKey::Caption, TaskInput::Text("x".into()), priority)
    }

    #[test]
    fn higher_priority_dequeues_first() {
        let mut q = PriorityTaskQueue::new();
        q.push(task(Priority::Low));
        q.push(task(Priority::Critical));
        q.push(task(Priority::Normal));
        q.push(task(Priority::High));

        assert_eq!(q.pop().unwrap().priority, Priority::Critical);
        assert_eq!(q.pop().unwrap().priority, Priority::High);
        assert_eq!(q.pop().unwrap().priority, Priority::Normal);
        assert_eq!(q.pop().unwrap().priority, Priority::Low);
        assert!(q.pop().is_none());
    }

    #[test]
    fn same_band_is_fifo() {
        let mut q = PriorityTaskQueue::new();
        let first = task(Priority::Normal);
        let second = task(Priority::Normal);
        let first_id = first.id.clone();
        let second_id = second.id.clone();
        q.push(first);
        q.push(second);

        assert_eq!(q.pop().unwrap().id, first_id);
        assert_eq!(q.pop().unwrap().id, second_id);
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut q = PriorityTaskQueue::new();
        let t = task(Priority::Normal);
        let id = t.id.clone();
        q.push(t);

        let cancelled = q.cancel(&id).expect("cancel must succeed");
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_unknown_task_errors() {
        let mut q = PriorityTaskQueue::new();
        assert!(matches!(
            q.cancel("missing"),
            Err(OrchestratorError::TaskNotFound { .. })
        ));
    }
}

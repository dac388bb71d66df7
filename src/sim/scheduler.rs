//! Single-threaded timer queue
//!
//! Replaces browser `setTimeout` bookkeeping with an explicit queue driven by a
//! virtual clock. Every scheduled task gets a `TaskId` that the caller keeps
//! so the transition that supersedes it can cancel it.

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TaskId,
    due_ms: f64,
    task: T,
}

/// Timer queue over a monotonic virtual clock (ms)
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    now_ms: f64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current clock time (ms)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Run `task` once `delay_ms` has elapsed
    pub fn schedule(&mut self, delay_ms: f64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            task,
        });
        id
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Time until a pending task fires
    pub fn remaining_ms(&self, id: TaskId) -> Option<f64> {
        self.pending
            .iter()
            .find(|p| p.id == id)
            .map(|p| (p.due_ms - self.now_ms).max(0.0))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock to
    /// its due time. Equal due times fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(TaskId, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.0.cmp(&b.id.0))
            })
            .map(|(i, _)| i)?;

        let pending = self.pending.remove(index);
        self.now_ms = self.now_ms.max(pending.due_ms);
        Some((pending.id, pending.task))
    }

    /// Move the clock forward without running anything
    pub fn advance_clock(&mut self, to_ms: f64) {
        self.now_ms = self.now_ms.max(to_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut q = TaskQueue::new();
        q.schedule(30.0, "c");
        q.schedule(10.0, "a");
        q.schedule(20.0, "b");

        let mut fired = Vec::new();
        while let Some((_, task)) = q.pop_due(100.0) {
            fired.push(task);
        }
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(q.now_ms(), 30.0);
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut q = TaskQueue::new();
        q.schedule(5.0, 1);
        q.schedule(5.0, 2);
        assert_eq!(q.pop_due(5.0).map(|(_, t)| t), Some(1));
        assert_eq!(q.pop_due(5.0).map(|(_, t)| t), Some(2));
    }

    #[test]
    fn test_not_due_yet() {
        let mut q = TaskQueue::new();
        q.schedule(50.0, ());
        assert!(q.pop_due(49.9).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut q = TaskQueue::new();
        let id = q.schedule(50.0, "x");
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.pop_due(1000.0).is_none());
    }

    #[test]
    fn test_remaining_and_relative_scheduling() {
        let mut q = TaskQueue::new();
        q.advance_clock(100.0);
        let id = q.schedule(300.0, ());
        q.advance_clock(250.0);
        assert_eq!(q.remaining_ms(id), Some(150.0));

        // Tasks scheduled from a handler are relative to the handler's due time
        let mut q = TaskQueue::new();
        q.schedule(50.0, 0);
        let (_, _) = q.pop_due(1000.0).unwrap();
        q.schedule(50.0, 1);
        let (_, t) = q.pop_due(1000.0).unwrap();
        assert_eq!(t, 1);
        assert_eq!(q.now_ms(), 100.0);
    }
}

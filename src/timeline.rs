use std::collections::BTreeMap;

/// Virtual-millisecond task queue. Nothing runs on its own: the owner drains
/// due tasks with [`Timeline::pop_due`] and then settles the clock with
/// [`Timeline::advance_to`]. Tasks due at the same instant come out in the
/// order they were scheduled.
#[derive(Debug)]
pub struct Timeline<T> {
    now_ms: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            seq: 0,
            queue: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn schedule(&mut self, delay_ms: u64, task: T) {
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, self.seq), task);
        self.seq += 1;
    }

    /// Removes the earliest task due at or before `deadline_ms` and moves the
    /// clock to its due time.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<T> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > deadline_ms {
            return None;
        }
        self.now_ms = self.now_ms.max(due);
        self.queue.remove(&(due, seq))
    }

    pub fn advance_to(&mut self, deadline_ms: u64) {
        self.now_ms = self.now_ms.max(deadline_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popped_tasks_leave_the_queue() {
        let mut timeline = Timeline::new();
        timeline.schedule(1, ());
        timeline.schedule(2, ());
        assert_eq!(timeline.pending(), 2);

        timeline.pop_due(1);
        assert_eq!(timeline.pending(), 1);
    }

    #[test]
    fn pops_in_due_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(300, "c");
        timeline.schedule(100, "a");
        timeline.schedule(200, "b");

        let mut order = Vec::new();
        while let Some(task) = timeline.pop_due(1_000) {
            order.push((task, timeline.now_ms()));
        }
        assert_eq!(order, vec![("a", 100), ("b", 200), ("c", 300)]);
    }

    #[test]
    fn same_instant_keeps_schedule_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(50, 1);
        timeline.schedule(50, 2);
        timeline.schedule(50, 3);

        let drained: Vec<_> = std::iter::from_fn(|| timeline.pop_due(50)).collect();
        assert_eq!(drained, vec![1, 2, 3]);
    }

    #[test]
    fn future_tasks_wait() {
        let mut timeline = Timeline::new();
        timeline.schedule(500, ());

        assert!(timeline.pop_due(499).is_none());
        timeline.advance_to(499);
        assert_eq!(timeline.now_ms(), 499);
        assert!(timeline.pop_due(500).is_some());
    }

    #[test]
    fn schedule_is_relative_to_current_time() {
        let mut timeline = Timeline::new();
        timeline.advance_to(1_000);
        timeline.schedule(10, ());

        assert!(timeline.pop_due(1_009).is_none());
        assert!(timeline.pop_due(1_010).is_some());
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut timeline: Timeline<()> = Timeline::new();
        timeline.advance_to(100);
        timeline.advance_to(50);
        assert_eq!(timeline.now_ms(), 100);
    }
}

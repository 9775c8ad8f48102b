//! Self-perpetuating trigger tasks.

use fastrand::Rng;

use crate::graph::NodeId;

/*
Retrigger Scheduling
====================

Rain is a stream of droplets at irregular intervals. Each droplet is a
trigger on a percussive envelope, and each trigger decides when the next one
happens:

    t0 ──→ t1 = t0 + U(0.05, 0.30) ──→ t2 = t1 + U(0.05, 0.30) ──→ ...

Triggers are queued ahead of the clock so the audio thread never waits for the
control side. The window is bounded: a task only holds triggers for the next
`lookahead` seconds and tops itself up every block as the clock advances.

    now                now + lookahead
     │  ▼   ▼  ▼    ▼  ▼ │
     └─────────────────────┘   queued on the envelope

Cancelling a task stops all future top-ups. A task whose target node has
been disposed cancels itself.
*/

pub const DEFAULT_LOOKAHEAD: f64 = 60.0;

/// Outcome of handing one trigger to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// The target's queue is full; try again next block.
    Full,
    /// The target no longer exists.
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

pub struct RetriggerTask {
    target: NodeId,
    next: f64,
    min_interval: f64,
    max_interval: f64,
    lookahead: f64,
    rng: Rng,
}

impl RetriggerTask {
    /// Fire `target` first at `start`, then at random intervals.
    pub fn new(target: NodeId, start: f64) -> Self {
        Self {
            target,
            next: start,
            min_interval: 0.05,
            max_interval: 0.30,
            lookahead: DEFAULT_LOOKAHEAD,
            rng: Rng::new(),
        }
    }

    /// Uniform interval range in seconds.
    pub fn interval(mut self, min: f64, max: f64) -> Self {
        self.min_interval = min.max(1e-3);
        self.max_interval = max.max(self.min_interval);
        self
    }

    pub fn lookahead(mut self, seconds: f64) -> Self {
        self.lookahead = seconds.max(0.0);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Rng::with_seed(seed);
        self
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Next trigger time not yet handed out.
    pub fn next(&self) -> f64 {
        self.next
    }

    fn draw_interval(&mut self) -> f64 {
        self.min_interval + (self.max_interval - self.min_interval) * self.rng.f64()
    }

    /// Hand out every trigger in `[now, now + lookahead)`.
    ///
    /// Triggers that fell behind the clock are skipped. Returns false once the
    /// target is gone.
    pub fn fill(&mut self, now: f64, mut deliver: impl FnMut(f64) -> Delivery) -> bool {
        if self.next < now {
            self.next = now + self.draw_interval();
        }

        while self.next < now + self.lookahead {
            match deliver(self.next) {
                Delivery::Queued => self.next += self.draw_interval(),
                Delivery::Full => return true,
                Delivery::Gone => return false,
            }
        }
        true
    }
}

#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<(TaskId, RetriggerTask)>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: RetriggerTask) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push((id, task));
        id
    }

    /// Stop a task. Returns false if it was already gone.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(task_id, _)| *task_id != id);
        self.tasks.len() != before
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|(task_id, _)| *task_id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Top up every task's window at `now`.
    pub fn tick(&mut self, now: f64, mut deliver: impl FnMut(NodeId, f64) -> Delivery) {
        self.tasks.retain_mut(|(_, task)| {
            let target = task.target();
            task.fill(now, |at| deliver(target, at))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn some_node() -> NodeId {
        Graph::new(48_000.0).destination()
    }

    #[test]
    fn intervals_stay_in_range() {
        let mut task = RetriggerTask::new(some_node(), 0.0).seed(7);
        let mut times = Vec::new();
        task.fill(0.0, |at| {
            times.push(at);
            Delivery::Queued
        });

        assert!(!times.is_empty());
        assert_eq!(times[0], 0.0);
        for pair in times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((0.05..=0.30).contains(&gap), "gap {gap}");
        }
    }

    #[test]
    fn window_is_bounded_by_lookahead() {
        let mut task = RetriggerTask::new(some_node(), 0.0).lookahead(2.0).seed(1);
        let mut times = Vec::new();
        task.fill(0.0, |at| {
            times.push(at);
            Delivery::Queued
        });

        assert!(times.iter().all(|t| *t < 2.0));
        assert!(times.len() <= (2.0f64 / 0.05) as usize + 1);

        let before = times.len();
        task.fill(1.0, |at| {
            times.push(at);
            Delivery::Queued
        });
        assert!(times.len() > before);
        assert!(times.iter().all(|t| *t < 3.0));
    }

    #[test]
    fn late_triggers_are_skipped() {
        let mut task = RetriggerTask::new(some_node(), 0.0).lookahead(1.0).seed(3);
        let mut times = Vec::new();
        task.fill(10.0, |at| {
            times.push(at);
            Delivery::Queued
        });

        assert!(times.iter().all(|t| *t > 10.0));
    }

    #[test]
    fn full_target_keeps_task_and_position() {
        let mut task = RetriggerTask::new(some_node(), 0.5).seed(3);
        assert!(task.fill(0.0, |_| Delivery::Full));
        assert_eq!(task.next(), 0.5);
    }

    #[test]
    fn cancelled_task_stops_delivering() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.add(RetriggerTask::new(some_node(), 0.0).lookahead(1.0));

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        let mut delivered = 0;
        scheduler.tick(5.0, |_, _| {
            delivered += 1;
            Delivery::Queued
        });
        assert_eq!(delivered, 0);
    }

    #[test]
    fn gone_target_drops_task() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.add(RetriggerTask::new(some_node(), 0.0));

        scheduler.tick(0.0, |_, _| Delivery::Gone);
        assert!(!scheduler.contains(id));
        assert!(scheduler.is_empty());
    }
}

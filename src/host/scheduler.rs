//! Virtual-clock scheduler.

use crate::presenter::{Scheduler, TimerTask};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Timeline {
    now: Duration,
    next_seq: u64,
    /// (deadline, sequence, task); sequence keeps equal deadlines in FIFO order
    pending: Vec<(Duration, u64, TimerTask)>,
}

/// Scheduler whose clock only moves when [`ManualScheduler::advance`] is called.
///
/// `Clone` shares the timeline.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timeline: Arc<Mutex<Timeline>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward and returns the tasks that came due, in
    /// deadline order.
    pub fn advance(&self, by: Duration) -> Vec<TimerTask> {
        let mut timeline = self.timeline.lock();
        timeline.now += by;
        let now = timeline.now;

        let (mut due, pending): (Vec<_>, Vec<_>) = timeline
            .pending
            .drain(..)
            .partition(|(deadline, _, _)| *deadline <= now);
        timeline.pending = pending;

        due.sort_by_key(|(deadline, seq, _)| (*deadline, *seq));
        due.into_iter().map(|(_, _, task)| task).collect()
    }

    /// Number of tasks not yet due.
    pub fn pending(&self) -> usize {
        self.timeline.lock().pending.len()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.timeline.lock().now
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: TimerTask, delay: Duration) {
        let mut timeline = self.timeline.lock();
        let deadline = timeline.now + delay;
        let seq = timeline.next_seq;
        timeline.next_seq += 1;
        timeline.pending.push((deadline, seq, task));
    }
}

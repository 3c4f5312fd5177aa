//! Scheduler: logical clock plus the single queue of delayed machine work
//!
//! Reel steps, deferred bonus awards and win-counter ticks all wait here.
//! Nothing sleeps: the owner moves the clock forward and drains whatever
//! came due, oldest deadline first and FIFO among equal deadlines.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::payout::DeferredAward;

/// Work item waiting on the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Advance the reel one cell
    ReelStep,
    /// Collection or rage bonus coming due
    Award(DeferredAward),
    /// Move the displayed win one increment
    CounterTick,
}

impl ScheduledTask {
    pub fn is_award(&self) -> bool {
        matches!(self, Self::Award(_))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    due_ms: f64,
    seq: u64,
    task: ScheduledTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, earliest (due, seq) must surface first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Logical clock with a deadline-ordered task queue
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    next_seq: u64,
    queue: BinaryHeap<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time in milliseconds
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Queue `task` to run `delay_ms` after the current time
    pub fn schedule(&mut self, delay_ms: f64, task: ScheduledTask) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due_ms = self.now_ms + delay_ms.max(0.0);
        log::trace!("Scheduled {:?} at {:.1}ms (#{})", task, due_ms, seq);
        self.queue.push(Entry { due_ms, seq, task });
        seq
    }

    /// Deadline of the next task, if any
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.due_ms)
    }

    /// Pop the next task due at or before `until_ms`, moving the clock to
    /// its deadline
    pub fn pop_due(&mut self, until_ms: f64) -> Option<ScheduledTask> {
        if self.next_due()? > until_ms {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry.task)
    }

    /// Move the clock forward without running anything
    pub fn advance_to(&mut self, until_ms: f64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Count queued tasks matching `pred`
    pub fn pending_where(&self, pred: impl Fn(&ScheduledTask) -> bool) -> usize {
        self.queue.iter().filter(|e| pred(&e.task)).count()
    }
}

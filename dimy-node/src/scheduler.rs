//! Single-threaded cooperative priority-queue scheduler (spec.md §5, §9).
//!
//! No teacher analogue: the teacher's workspace hands concurrency to tokio
//! tasks and channels throughout (e.g. `oprf-client`'s session map), but the
//! node's shared state (`ShareTable`, `OwnShares`, the DBF ring,
//! `LastSecret`) is specified to rely on the *absence* of concurrency for
//! its correctness, so a single task loop draining a priority queue keyed by
//! `(scheduled_time, priority, insertion_counter)` is the shape spec.md §5/§9
//! calls for directly.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct ScheduledEvent<T> {
    time: f64,
    priority: u8,
    seq: u64,
    task: T,
}

impl<T> PartialEq for ScheduledEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.priority == other.priority && self.seq == other.seq
    }
}
impl<T> Eq for ScheduledEvent<T> {}

impl<T> PartialOrd for ScheduledEvent<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledEvent<T> {
    /// Reversed so [`BinaryHeap`] (a max-heap) pops the earliest-scheduled,
    /// lowest-priority, earliest-inserted event first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A priority queue of `(scheduled_time, priority, task)` triples.
pub struct Scheduler<T> {
    heap: BinaryHeap<ScheduledEvent<T>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    /// Builds an empty scheduler.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `task` to run at scaled time `time`, breaking ties with
    /// `priority` ascending (lower runs first) and then insertion order.
    pub fn schedule(&mut self, time: f64, priority: u8, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledEvent {
            time,
            priority,
            seq,
            task,
        });
    }

    /// Removes and returns the earliest-scheduled task along with its
    /// scheduled time.
    pub fn pop(&mut self) -> Option<(f64, T)> {
        self.heap.pop().map(|event| (event.time, event.task))
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_earliest_time_first() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(5.0, 1, "late");
        scheduler.schedule(1.0, 1, "early");
        assert_eq!(scheduler.pop(), Some((1.0, "early")));
        assert_eq!(scheduler.pop(), Some((5.0, "late")));
    }

    #[test]
    fn breaks_ties_by_priority_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10.0, 2, "dbf_cycle");
        scheduler.schedule(10.0, 1, "qbf_create");
        assert_eq!(scheduler.pop(), Some((10.0, "qbf_create")));
        assert_eq!(scheduler.pop(), Some((10.0, "dbf_cycle")));
    }
}

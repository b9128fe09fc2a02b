//! Time-ordered event queue.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::SimTime;

/// A scheduled simulation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// One mobility step of a vessel segment (nanobot pass, then biomarker
    /// pass).
    Tick { vessel: u32 },
    /// One biomarker release burst from an infection-source vessel.
    Burst { vessel: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    time: SimTime,
    seq: u64,
    event: Event,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // seq breaks timestamp ties so equal-time events pop in push order
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of pending events, ordered by time then insertion order.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: SimTime, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { time, seq, event }));
    }

    /// Pops the earliest event not later than `stop`. Events past the stop
    /// time stay queued and are simply never delivered.
    pub fn pop_until(&mut self, stop: SimTime) -> Option<(SimTime, Event)> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.time <= stop => {
                let Reverse(entry) = self.heap.pop().expect("peeked entry");
                Some((entry.time, entry.event))
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

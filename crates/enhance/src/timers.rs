use core_types::Millis;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Deferred actions keyed by deadline on the page clock.
///
/// Timers with equal deadlines fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Reverse<(Millis, u64)>>,
    pending: HashMap<u64, T>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Millis, action: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline, seq)));
        self.pending.insert(seq, action);
        TimerId(seq)
    }

    /// Returns the action if the timer had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.pending.remove(&id.0)
    }

    /// Removes and returns every action whose deadline is at or before `now`, earliest first.
    pub fn due(&mut self, now: Millis) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(Reverse((deadline, seq))) = self.heap.peek().copied() {
            if deadline > now {
                break;
            }
            self.heap.pop();
            if let Some(action) = self.pending.remove(&seq) {
                out.push(action);
            }
        }
        out
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.heap
            .iter()
            .filter(|Reverse((_, seq))| self.pending.contains_key(seq))
            .map(|Reverse((deadline, _))| *deadline)
            .min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

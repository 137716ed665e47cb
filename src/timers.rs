use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::shared::KeyId;

/// Deferred note-offs. Fired by the host loop independently of frame ticks,
/// and cancelled as a group when the owning playback session ends.
#[derive(Debug, Default)]
pub struct ReleaseTimers {
    heap: BinaryHeap<Reverse<(u64, u64, KeyId)>>, // due, sequence, key
    next_seq: u64,
}

impl ReleaseTimers {
    pub fn schedule(&mut self, due_ms: u64, key: KeyId) {
        // the sequence number keeps equal due times in scheduling order
        self.heap.push(Reverse((due_ms, self.next_seq, key)));
        self.next_seq += 1;
    }

    /// Remove and return every key due at `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<KeyId> {
        let mut due = Vec::new();
        while let Some(Reverse((at, _, key))) = self.heap.peek().copied() {
            if at > now_ms {
                break;
            }
            self.heap.pop();
            due.push(key);
        }
        due
    }

    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse((at, _, _))| *at)
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.heap.len();
        self.heap.clear();
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drains_in_due_order() {
        let mut timers = ReleaseTimers::default();
        timers.schedule(500, KeyId(3));
        timers.schedule(100, KeyId(1));
        timers.schedule(100, KeyId(2));
        assert_eq!(Some(100), timers.next_due());

        assert!(timers.drain_due(99).is_empty());
        assert_eq!(vec![KeyId(1), KeyId(2)], timers.drain_due(100));
        assert_eq!(Some(500), timers.next_due());
        assert_eq!(vec![KeyId(3)], timers.drain_due(10_000));
        assert_eq!(None, timers.next_due());
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = ReleaseTimers::default();
        timers.schedule(10, KeyId(1));
        timers.schedule(20, KeyId(2));
        assert_eq!(2, timers.cancel_all());
        assert!(timers.drain_due(u64::MAX).is_empty());
    }
}

/*
 * Sleep Queue
 *
 * Threads blocked in `sleep()`, ordered by the tick they must wake on.
 *
 * ## Ordering
 *
 * Entries are kept sorted by `wake_tick` ascending. A new sleeper goes after
 * every existing entry with the same wake tick, so sleepers that share a
 * wake tick are released in the order they went to sleep.
 *
 * ## Draining
 *
 * The tick handler pops from the head while the head is due. Because the
 * queue is sorted, the first entry that is not due ends the drain, so the
 * cost per tick is proportional to the number of sleepers released.
 *
 * ## Locking
 *
 * The queue itself is not synchronized. `Timer` keeps it behind a spin lock
 * that is only ever taken with interrupts masked.
 */

use alloc::collections::VecDeque;

use crate::scheduler::ThreadId;

/// A blocked thread and the absolute tick it must not resume before
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sleeper {
    pub wake_tick: i64,
    pub thread: ThreadId,
}

pub struct SleepQueue {
    sleepers: VecDeque<Sleeper>,
}

impl SleepQueue {
    pub const fn new() -> Self {
        Self {
            sleepers: VecDeque::new(),
        }
    }

    /// Insert `thread` to wake at `wake_tick`, after any equal wake ticks
    ///
    /// A thread may be queued at most once.
    pub fn insert(&mut self, thread: ThreadId, wake_tick: i64) {
        debug_assert!(
            !self.contains(thread),
            "{} is already in the sleep queue",
            thread
        );

        let pos = self.sleepers.partition_point(|s| s.wake_tick <= wake_tick);
        self.sleepers.insert(pos, Sleeper { wake_tick, thread });
        debug_assert!(self.is_ordered(), "sleep queue out of wake order");
    }

    /// Remove and return the head if it is due at tick `now`
    pub fn pop_due(&mut self, now: i64) -> Option<Sleeper> {
        match self.sleepers.front() {
            Some(head) if head.wake_tick <= now => self.sleepers.pop_front(),
            _ => None,
        }
    }

    /// Remove `thread` wherever it is (cancellation)
    pub fn remove(&mut self, thread: ThreadId) -> Option<Sleeper> {
        let pos = self.sleepers.iter().position(|s| s.thread == thread)?;
        self.sleepers.remove(pos)
    }

    pub fn contains(&self, thread: ThreadId) -> bool {
        self.sleepers.iter().any(|s| s.thread == thread)
    }

    pub fn wake_tick_of(&self, thread: ThreadId) -> Option<i64> {
        self.sleepers
            .iter()
            .find(|s| s.thread == thread)
            .map(|s| s.wake_tick)
    }

    pub fn len(&self) -> usize {
        self.sleepers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sleepers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sleeper> {
        self.sleepers.iter()
    }

    /// True when every adjacent pair is in wake-tick order
    fn is_ordered(&self) -> bool {
        self.sleepers
            .iter()
            .zip(self.sleepers.iter().skip(1))
            .all(|(a, b)| a.wake_tick <= b.wake_tick)
    }
}

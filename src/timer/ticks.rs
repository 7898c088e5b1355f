/*
 * Tick Counter
 *
 * Number of timer ticks since the timer was initialized. The only write is
 * the `+1` the tick handler performs; everyone else reads.
 *
 * Reads from thread context go through `Timer::ticks`, which masks
 * interrupts around the load and places a compiler barrier after it, so
 * the returned value is either the pre- or the post-increment value of a
 * concurrent tick and the compiler cannot move it past later accesses.
 */

use core::sync::atomic::{AtomicI64, Ordering};

pub struct TickCounter {
    ticks: AtomicI64,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicI64::new(0),
        }
    }

    /// Advance by one tick and return the new count
    ///
    /// Tick handler only.
    pub(crate) fn advance(&self) -> i64 {
        self.ticks.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Raw load without masking
    ///
    /// Fine from the tick handler (already masked) and from spin loops
    /// that only compare for change.
    pub(crate) fn load(&self) -> i64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

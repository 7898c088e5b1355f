/*
 * Collaborator Trait Definitions
 *
 * The timer does not own threads, interrupt routing, or the timer chip.
 * It reaches them only through these traits:
 *
 * - Scheduler: current thread, block/unblock, per-tick preemption accounting
 * - InterruptController: interrupt masking and external handler registration
 * - IntervalTimer: the periodic interrupt source
 *
 * This separation allows:
 * 1. Linking the timer into a kernel with any scheduler implementation
 * 2. Testing the sleep queue and tick handler against a mock clock
 * 3. Clear ownership boundaries (the timer never touches Thread structs)
 */

use super::types::{IntrLevel, ThreadId};
use crate::config::Frequency;

/// Scheduler operations the timer depends on
///
/// Contract on the implementation: a thread that is destroyed while
/// sleeping must first be removed with `Timer::cancel_sleep`.
pub trait Scheduler: Sync {
    /// Thread currently running on the CPU
    ///
    /// Must be callable with interrupts disabled.
    fn current_thread(&self) -> ThreadId;

    /// Block the current thread and switch away
    ///
    /// Called with interrupts disabled. On return (after an `unblock` and a
    /// later switch back) interrupts are still disabled.
    fn block_current(&self);

    /// Move a blocked thread to the ready state
    ///
    /// Safe to call from interrupt context.
    fn unblock(&self, thread: ThreadId);

    /// Per-tick preemption bookkeeping
    ///
    /// Called from the tick handler with interrupts disabled.
    fn tick_notify(&self);
}

/// Interrupt controller operations the timer depends on
pub trait InterruptController: Sync {
    /// Mask interrupts and return the previous level
    fn disable(&self) -> IntrLevel;

    /// Restore a level previously returned by `disable`
    fn restore(&self, level: IntrLevel);

    /// Current interrupt level
    fn level(&self) -> IntrLevel;

    /// True while an external interrupt handler is running
    fn in_external_handler(&self) -> bool;

    /// Bind `handler` to an external interrupt vector
    fn register_external_handler(&self, vector: u8, handler: fn(), name: &'static str);
}

/// A periodic interrupt source
pub trait IntervalTimer {
    /// Program the source to deliver a tick interrupt `freq` times per second
    fn program(&mut self, freq: Frequency);
}

impl<T: Scheduler + ?Sized> Scheduler for &T {
    fn current_thread(&self) -> ThreadId {
        (**self).current_thread()
    }

    fn block_current(&self) {
        (**self).block_current()
    }

    fn unblock(&self, thread: ThreadId) {
        (**self).unblock(thread)
    }

    fn tick_notify(&self) {
        (**self).tick_notify()
    }
}

impl<T: InterruptController + ?Sized> InterruptController for &T {
    fn disable(&self) -> IntrLevel {
        (**self).disable()
    }

    fn restore(&self, level: IntrLevel) {
        (**self).restore(level)
    }

    fn level(&self) -> IntrLevel {
        (**self).level()
    }

    fn in_external_handler(&self) -> bool {
        (**self).in_external_handler()
    }

    fn register_external_handler(&self, vector: u8, handler: fn(), name: &'static str) {
        (**self).register_external_handler(vector, handler, name)
    }
}

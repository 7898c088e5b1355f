/*
 * Interrupt-Masking Critical Sections
 *
 * On a uniprocessor kernel masking interrupts is the only mutual exclusion
 * the timer needs: the tick handler runs masked, and thread code masks
 * around every access to the tick counter and the sleep queue.
 */

use crate::scheduler::{IntrLevel, traits::InterruptController};

/// RAII guard that disables interrupts for its lifetime
///
/// The level found on entry is restored on drop, so nested guards and
/// guards taken while already masked leave the CPU as they found it.
///
/// # Example
/// ```ignore
/// let _guard = InterruptGuard::new(&intc);
/// // Critical section - interrupts are disabled
/// // Previous level restored when _guard is dropped
/// ```
pub struct InterruptGuard<'a, I: InterruptController + ?Sized> {
    intc: &'a I,
    saved: IntrLevel,
}

impl<'a, I: InterruptController + ?Sized> InterruptGuard<'a, I> {
    /// Create a new interrupt guard, disabling interrupts
    pub fn new(intc: &'a I) -> Self {
        let saved = intc.disable();
        Self { intc, saved }
    }

    /// Level that will be restored on drop
    pub fn saved_level(&self) -> IntrLevel {
        self.saved
    }
}

impl<I: InterruptController + ?Sized> Drop for InterruptGuard<'_, I> {
    fn drop(&mut self) {
        self.intc.restore(self.saved);
    }
}

/// Execute a closure with interrupts disabled
pub fn without_interrupts<I, F, R>(intc: &I, f: F) -> R
where
    I: InterruptController + ?Sized,
    F: FnOnce() -> R,
{
    let _guard = InterruptGuard::new(intc);
    f()
}

/*
 * Scheduler Type Definitions
 *
 * Lightweight, Copy-able types shared between the timer and the scheduler
 * and interrupt controller it drives.
 */

use core::fmt;

/// Thread identifier
///
/// The scheduler owns threads; the timer only ever holds their IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub usize);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thread({})", self.0)
    }
}

/// Interrupt level of the CPU
///
/// `disable()` hands back the previous level so a critical section can
/// restore exactly what it found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntrLevel {
    /// Interrupts enabled
    On,

    /// Interrupts masked
    Off,
}

impl IntrLevel {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { IntrLevel::On } else { IntrLevel::Off }
    }

    pub fn is_on(self) -> bool {
        self == IntrLevel::On
    }
}

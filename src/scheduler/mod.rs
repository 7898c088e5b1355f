/*
 * Scheduler Interface
 *
 * The timer blocks and unblocks threads but does not schedule them. This
 * module holds the types and traits through which it talks to the kernel's
 * scheduler and interrupt controller.
 */

pub mod traits;
pub mod types;

pub use traits::{InterruptController, IntervalTimer, Scheduler};
pub use types::{IntrLevel, ThreadId};

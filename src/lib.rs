/*
 * CLUU Timer Subsystem
 *
 * The periodic tick and the sleep queue of the CLUU kernel, as a `no_std`
 * library the kernel links.
 *
 * Why this is important:
 * - Advances kernel time once per tick interrupt and drives the scheduler's
 *   preemption accounting
 * - Lets threads block for a number of ticks without burning CPU
 * - Provides calibrated busy-waits for delays shorter than one tick
 *
 * Bring-up order:
 * 1. `drivers::system::init()` (PIC remap)
 * 2. `timer_init()` (program PIT, register the tick handler)
 * 3. enable interrupts
 * 4. `timer_calibrate()`
 *
 * After that, `timer_sleep` and the real-time wrappers are usable from any
 * thread with interrupts enabled.
 */

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch;
pub mod config;
#[cfg(target_arch = "x86_64")]
pub mod drivers;
pub mod error;
pub mod scheduler;
pub mod sync;
pub mod timer;
pub mod utils;

#[cfg(test)]
mod testing;

use spin::Once;

pub use config::{Frequency, TIMER_FREQ};
pub use error::TimerError;
pub use scheduler::{InterruptController, IntervalTimer, IntrLevel, Scheduler, ThreadId};
pub use timer::{Timer, TimerStats};

/// The kernel's timer: collaborators behind `'static` trait objects
pub type SystemTimer = Timer<&'static dyn Scheduler, &'static dyn InterruptController>;

static SYSTEM_TIMER: Once<SystemTimer> = Once::new();

/// Make `timer` the process-wide instance
pub fn install(timer: SystemTimer) -> Result<&'static SystemTimer, TimerError> {
    let mut installed = false;
    let current = SYSTEM_TIMER.call_once(|| {
        installed = true;
        timer
    });

    if installed {
        Ok(current)
    } else {
        Err(TimerError::AlreadyInitialized)
    }
}

/// The process-wide instance, if `timer_init` has run
pub fn system_timer() -> Option<&'static SystemTimer> {
    SYSTEM_TIMER.get()
}

fn timer() -> &'static SystemTimer {
    match SYSTEM_TIMER.get() {
        Some(timer) => timer,
        None => panic!("timer used before timer_init"),
    }
}

/// Tick interrupt handler registered by `timer_init`
fn timer_interrupt() {
    if let Some(timer) = SYSTEM_TIMER.get() {
        timer.on_tick();
    }
}

/// Program the tick source at `TIMER_FREQ`, register the tick handler and
/// set up the sleep queue. Call once at boot.
pub fn timer_init(
    scheduler: &'static dyn Scheduler,
    intc: &'static dyn InterruptController,
    hw: &mut dyn IntervalTimer,
) {
    match install(Timer::new(TIMER_FREQ, scheduler, intc)) {
        Ok(timer) => timer.init(hw, timer_interrupt),
        Err(err) => log::warn!("timer_init: {}", err),
    }
}

/// Measure `loops_per_tick`. Requires interrupts enabled; call once after
/// `timer_init`.
pub fn timer_calibrate() {
    timer().calibrate();
}

/// Ticks since boot
pub fn timer_ticks() -> i64 {
    timer().ticks()
}

/// Ticks since `then`, a value once returned by `timer_ticks()`
pub fn timer_elapsed(then: i64) -> i64 {
    timer().elapsed(then)
}

/// Block the current thread for at least `ticks` ticks (no-op if <= 0)
pub fn timer_sleep(ticks: i64) {
    timer().sleep(ticks);
}

pub fn timer_msleep(ms: i64) {
    timer().msleep(ms);
}

pub fn timer_usleep(us: i64) {
    timer().usleep(us);
}

pub fn timer_nsleep(ns: i64) {
    timer().nsleep(ns);
}

/// Remove a thread that is about to be destroyed from the sleep queue
pub fn timer_cancel_sleep(thread: ThreadId) -> bool {
    timer().cancel_sleep(thread)
}

pub fn timer_stats() -> TimerStats {
    timer().stats()
}

/// Log the current tick count
pub fn timer_print_stats() {
    timer().print_stats();
}

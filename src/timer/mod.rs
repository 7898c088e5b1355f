/*
 * System Timer and Sleep Queue
 *
 * This module turns the periodic tick interrupt into kernel timing services:
 * a tick count since boot, blocking sleeps that release the CPU, and
 * calibrated busy-waits for delays shorter than one tick.
 *
 * ## Description
 *
 * ### Core Functionality:
 * - **Tick Counter**: 64-bit count of tick interrupts, written only by the
 *   tick handler
 * - **Sleep Queue**: threads blocked in `sleep()`, ordered by wake tick,
 *   FIFO among equal wake ticks
 * - **Tick Handler**: advances the counter, notifies the scheduler, then
 *   releases every sleeper that is due
 * - **Busy-Wait Calibration**: measures `loops_per_tick` once at boot for
 *   sub-tick real-time delays
 *
 * ### Concurrency:
 * - Uniprocessor: masking interrupts is the only mutual exclusion
 * - The tick handler runs with interrupts masked
 * - Thread code masks interrupts around every tick read and queue update
 * - The sleep-queue lock is only ever taken while masked, so it is never
 *   contended
 *
 * ### Collaborators:
 * - `Scheduler` supplies the current thread, block/unblock and per-tick
 *   accounting
 * - `InterruptController` supplies masking and handler registration
 * - `IntervalTimer` is the hardware that delivers the tick
 */

pub mod calibrate;
pub mod realtime;
pub mod sleep_queue;
pub mod ticks;

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering, compiler_fence};
use spin::Mutex;

use crate::config::{Frequency, TIMER_HANDLER_NAME, TIMER_VECTOR};
use crate::error::TimerError;
use crate::scheduler::{
    ThreadId,
    traits::{InterruptController, IntervalTimer, Scheduler},
};
use crate::sync::{InterruptGuard, without_interrupts};

use calibrate::{LoopProbe, TickProbe, busy_wait, calibrate_loops};
use realtime::{Delay, MICROS_PER_SEC, MILLIS_PER_SEC, NANOS_PER_SEC};
use sleep_queue::{SleepQueue, Sleeper};
use ticks::TickCounter;

/// Snapshot of timer state for diagnostics
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerStats {
    pub ticks: i64,
    pub sleepers: usize,
    pub loops_per_tick: Option<u32>,
}

impl fmt::Display for TimerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer: {} ticks, {} sleepers", self.ticks, self.sleepers)?;
        match self.loops_per_tick {
            Some(loops) => write!(f, ", {} loops/tick", loops),
            None => write!(f, ", uncalibrated"),
        }
    }
}

/// The timer subsystem
///
/// One instance per kernel. `S` and `I` are usually `&'static dyn` trait
/// objects (see `SystemTimer`); tests use mocks.
pub struct Timer<S, I> {
    freq: Frequency,
    scheduler: S,
    intc: I,
    ticks: TickCounter,
    loops_per_tick: AtomicU32,
    calibrated: AtomicBool,
    sleepers: Mutex<SleepQueue>,
}

impl<S, I> Timer<S, I>
where
    S: Scheduler,
    I: InterruptController,
{
    pub const fn new(freq: Frequency, scheduler: S, intc: I) -> Self {
        Self {
            freq,
            scheduler,
            intc,
            ticks: TickCounter::new(),
            loops_per_tick: AtomicU32::new(0),
            calibrated: AtomicBool::new(false),
            sleepers: Mutex::new(SleepQueue::new()),
        }
    }

    /// Program the tick source and register `handler` for its vector
    ///
    /// Call once at bring-up, before interrupts are enabled. `handler` must
    /// end up calling `on_tick` on this instance.
    pub fn init<H: IntervalTimer + ?Sized>(&self, hw: &mut H, handler: fn()) {
        log::info!(
            "Initializing timer at {} (PIT divisor: {})",
            self.freq,
            self.freq.pit_divisor()
        );

        hw.program(self.freq);
        self.intc
            .register_external_handler(TIMER_VECTOR, handler, TIMER_HANDLER_NAME);

        log::info!("Timer handler registered on vector {:#x}", TIMER_VECTOR);
    }

    /// Measure `loops_per_tick` against the live tick
    ///
    /// Requires interrupts enabled. Panics if calibration overflows.
    pub fn calibrate(&self) -> u32 {
        debug_assert!(
            self.intc.level().is_on(),
            "{}",
            TimerError::InterruptsDisabled
        );
        log::info!("Calibrating timer...");

        let probe = self.tick_probe();
        self.calibrate_with(&probe)
    }

    /// Calibrate through an arbitrary probe and publish the result
    pub fn calibrate_with<P: LoopProbe + ?Sized>(&self, probe: &P) -> u32 {
        debug_assert!(!self.is_calibrated(), "timer calibrated twice");

        let loops = match calibrate_loops(probe) {
            Ok(loops) => loops,
            Err(err) => panic!("Timer calibration failed: {}", err),
        };

        self.loops_per_tick.store(loops, Ordering::SeqCst);
        self.calibrated.store(true, Ordering::Release);

        log::info!(
            "Timer calibrated: {} loops/s",
            loops as u64 * self.freq.hz() as u64
        );
        loops
    }

    /// Probe measuring `busy_wait` against this timer's tick counter
    pub fn tick_probe(&self) -> TickProbe<'_> {
        TickProbe::new(&self.ticks)
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated.load(Ordering::Acquire)
    }

    pub fn loops_per_tick(&self) -> Result<u32, TimerError> {
        if self.is_calibrated() {
            Ok(self.loops_per_tick.load(Ordering::SeqCst))
        } else {
            Err(TimerError::NotCalibrated)
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    /// Ticks since the timer was initialized
    pub fn ticks(&self) -> i64 {
        let t = without_interrupts(&self.intc, || self.ticks.load());
        compiler_fence(Ordering::SeqCst);
        t
    }

    /// Ticks elapsed since `then`, a value once returned by `ticks()`
    pub fn elapsed(&self, then: i64) -> i64 {
        self.ticks() - then
    }

    /// Block the current thread for at least `ticks` ticks
    ///
    /// No-op for `ticks <= 0`. Must be called from thread context with
    /// interrupts enabled.
    pub fn sleep(&self, ticks: i64) {
        let start = self.ticks();
        if ticks <= 0 {
            return;
        }

        debug_assert!(
            !self.intc.in_external_handler(),
            "sleep() called from interrupt context"
        );

        let guard = InterruptGuard::new(&self.intc);
        debug_assert!(
            guard.saved_level().is_on(),
            "{}",
            TimerError::InterruptsDisabled
        );

        let thread = self.scheduler.current_thread();
        let wake_tick = start.saturating_add(ticks);
        self.sleepers.lock().insert(thread, wake_tick);
        log::trace!("{} sleeping until tick {}", thread, wake_tick);

        self.scheduler.block_current();
        drop(guard);
    }

    /// Sleep for approximately `ms` milliseconds
    pub fn msleep(&self, ms: i64) {
        self.real_time_sleep(ms, MILLIS_PER_SEC);
    }

    /// Sleep for approximately `us` microseconds
    pub fn usleep(&self, us: i64) {
        self.real_time_sleep(us, MICROS_PER_SEC);
    }

    /// Sleep for approximately `ns` nanoseconds
    pub fn nsleep(&self, ns: i64) {
        self.real_time_sleep(ns, NANOS_PER_SEC);
    }

    /// Sleep for approximately `num / denom` seconds
    ///
    /// Whole ticks block on the sleep queue; anything shorter spins.
    pub fn real_time_sleep(&self, num: i64, denom: i32) {
        debug_assert!(
            self.intc.level().is_on(),
            "{}",
            TimerError::InterruptsDisabled
        );

        let loops_per_tick = self.loops_per_tick.load(Ordering::SeqCst);
        match Delay::plan(num, denom, self.freq, loops_per_tick) {
            Delay::Ticks(ticks) => self.sleep(ticks),
            Delay::Spin(loops) => {
                debug_assert!(
                    num <= 0 || self.is_calibrated(),
                    "sub-tick sleep: {}",
                    TimerError::NotCalibrated
                );
                busy_wait(loops);
            }
        }
    }

    /// Tick interrupt handler body
    ///
    /// Runs with interrupts masked: advance the counter, let the scheduler
    /// do its preemption accounting, then unblock every due sleeper in
    /// queue order.
    pub fn on_tick(&self) {
        debug_assert!(
            !self.intc.level().is_on(),
            "tick handler entered with interrupts enabled"
        );

        let now = self.ticks.advance();
        self.scheduler.tick_notify();

        while let Some(sleeper) = self.pop_due(now) {
            log::trace!("tick {}: waking {}", now, sleeper.thread);
            self.scheduler.unblock(sleeper.thread);
        }
    }

    fn pop_due(&self, now: i64) -> Option<Sleeper> {
        self.sleepers.lock().pop_due(now)
    }

    /// Remove `thread` from the sleep queue without waking it
    ///
    /// The scheduler must call this before destroying a sleeping thread.
    /// Returns whether the thread was sleeping.
    pub fn cancel_sleep(&self, thread: ThreadId) -> bool {
        let removed = without_interrupts(&self.intc, || self.sleepers.lock().remove(thread));
        if let Some(sleeper) = removed {
            log::debug!("{} sleep until tick {} cancelled", thread, sleeper.wake_tick);
        }
        removed.is_some()
    }

    /// Wake tick of `thread` if it is sleeping
    pub fn wake_tick_of(&self, thread: ThreadId) -> Option<i64> {
        without_interrupts(&self.intc, || self.sleepers.lock().wake_tick_of(thread))
    }

    /// Number of sleeping threads
    pub fn sleepers(&self) -> usize {
        without_interrupts(&self.intc, || self.sleepers.lock().len())
    }

    /// Copy of the sleep queue in wake order
    pub fn sleep_queue_snapshot(&self) -> Vec<Sleeper> {
        without_interrupts(&self.intc, || {
            self.sleepers.lock().iter().copied().collect()
        })
    }

    pub fn stats(&self) -> TimerStats {
        TimerStats {
            ticks: self.ticks(),
            sleepers: self.sleepers(),
            loops_per_tick: self.loops_per_tick().ok(),
        }
    }

    /// Log the current tick count
    pub fn print_stats(&self) {
        log::info!("Timer: {} ticks", self.ticks());
    }
}

/*
 * Busy-Wait Calibration
 *
 * Sub-tick delays cannot use the sleep queue, so they spin. To know how
 * long to spin, `calibrate_loops` measures `loops_per_tick`: the largest
 * loop count of `busy_wait` that still completes within one tick.
 *
 * ## Algorithm
 *
 * 1. Coarse: start at 2^10 and double while twice the count still fits in
 *    a tick. This yields the largest power of two that fits.
 * 2. Refine: for each of the next 10 bits below that power of two, tentatively
 *    set the bit and keep it if the count still fits.
 *
 * Whether a count fits is asked through `LoopProbe`. On hardware that is
 * `TickProbe`, which aligns to a tick boundary, spins, and checks whether
 * the tick counter moved.
 */

use core::sync::atomic::{Ordering, compiler_fence};

use super::ticks::TickCounter;
use crate::config::{CALIBRATION_REFINE_BITS, CALIBRATION_START};
use crate::error::TimerError;

/// Answers "does `busy_wait(loops)` take longer than one tick?"
pub trait LoopProbe {
    fn too_many_loops(&self, loops: u32) -> bool;
}

/// Spin for `loops` iterations
///
/// Never inlined: code alignment changes the cost of each iteration, and
/// calibration is only meaningful if every caller runs this same copy.
#[inline(never)]
pub fn busy_wait(mut loops: i64) {
    while loops > 0 {
        loops -= 1;
        compiler_fence(Ordering::SeqCst);
    }
}

/// Probe that measures against the live tick counter
///
/// Needs interrupts enabled, otherwise the first spin never ends.
pub struct TickProbe<'a> {
    ticks: &'a TickCounter,
}

impl<'a> TickProbe<'a> {
    pub fn new(ticks: &'a TickCounter) -> Self {
        Self { ticks }
    }
}

impl LoopProbe for TickProbe<'_> {
    fn too_many_loops(&self, loops: u32) -> bool {
        // Wait for a tick boundary
        let start = self.ticks.load();
        while self.ticks.load() == start {
            compiler_fence(Ordering::SeqCst);
        }

        let start = self.ticks.load();
        busy_wait(loops as i64);

        compiler_fence(Ordering::SeqCst);
        start != self.ticks.load()
    }
}

/// Measure `loops_per_tick` through `probe`
pub fn calibrate_loops<P: LoopProbe + ?Sized>(probe: &P) -> Result<u32, TimerError> {
    let mut loops = CALIBRATION_START;
    loop {
        let doubled = loops
            .checked_mul(2)
            .ok_or(TimerError::CalibrationOverflow)?;
        if probe.too_many_loops(doubled) {
            break;
        }
        loops = doubled;
    }

    let high_bit = loops;
    for shift in 1..=CALIBRATION_REFINE_BITS {
        let test_bit = high_bit >> shift;
        if !probe.too_many_loops(loops | test_bit) {
            loops |= test_bit;
        }
    }

    log::debug!("calibration: high bit {:#x}, loops_per_tick {}", high_bit, loops);
    Ok(loops)
}

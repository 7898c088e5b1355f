/*
 * Timer Error Types
 *
 * The public timer API has no failure return: every condition listed here
 * is a programming error that the caller turns into a panic. The enum
 * exists so the internal steps (calibration, singleton installation,
 * reading the calibration constant) can be tested in isolation.
 */

use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The coarse calibration loop count overflowed `u32`
    CalibrationOverflow,

    /// `loops_per_tick` was read before `calibrate()` ran
    NotCalibrated,

    /// An operation that needs a live tick ran with interrupts masked
    InterruptsDisabled,

    /// The process-wide timer was installed twice
    AlreadyInitialized,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::CalibrationOverflow => write!(f, "loops_per_tick calibration overflowed"),
            TimerError::NotCalibrated => write!(f, "timer has not been calibrated"),
            TimerError::InterruptsDisabled => write!(f, "interrupts must be enabled"),
            TimerError::AlreadyInitialized => write!(f, "timer already initialized"),
        }
    }
}

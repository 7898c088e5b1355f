/*
 * Timer Configuration
 *
 * Compile-time configuration for the timer subsystem: tick frequency,
 * 8254 input clock, the external interrupt vector the tick arrives on, and
 * the busy-wait calibration constants.
 *
 * The tick frequency is wrapped in `Frequency`, whose constructor is a
 * `const fn` that rejects values outside the range the 8254 can produce
 * with a 16-bit divisor. Using it in a `const` item turns a bad frequency
 * into a compile error.
 */

use core::fmt;

/// Lowest tick rate the 8254 supports (divisor must fit in 16 bits)
pub const MIN_FREQ_HZ: u32 = 19;

/// Highest recommended tick rate
pub const MAX_FREQ_HZ: u32 = 1000;

/// Input clock of the 8254 Programmable Interval Timer
pub const PIT_BASE_FREQ: u32 = 1_193_180;

/// External interrupt vector for IRQ0 (master PIC offset 0x20)
pub const TIMER_VECTOR: u8 = 0x20;

/// Name the tick handler is registered under
pub const TIMER_HANDLER_NAME: &str = "8254 Timer";

/// Loop count the coarse calibration phase starts from
pub const CALIBRATION_START: u32 = 1 << 10;

/// Bits of precision added below the coarse power of two
pub const CALIBRATION_REFINE_BITS: u32 = 10;

/// Tick frequency in Hz, validated at construction
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u32);

impl Frequency {
    /// Create a frequency, panicking (at compile time in `const` context)
    /// when `hz` is outside `MIN_FREQ_HZ..=MAX_FREQ_HZ`.
    pub const fn new(hz: u32) -> Self {
        assert!(hz >= MIN_FREQ_HZ, "8254 timer requires a frequency >= 19 Hz");
        assert!(hz <= MAX_FREQ_HZ, "timer frequency <= 1000 Hz recommended");
        Self(hz)
    }

    /// Get the value in Hz
    pub const fn hz(self) -> u32 {
        self.0
    }

    /// PIT channel 0 reload value for this frequency, rounded to nearest
    pub const fn pit_divisor(self) -> u16 {
        ((PIT_BASE_FREQ + self.0 / 2) / self.0) as u16
    }

    /// Length of one tick in nanoseconds
    pub const fn tick_nanos(self) -> u64 {
        1_000_000_000 / self.0 as u64
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.0)
    }
}

/// Kernel tick rate (10ms per tick)
pub const TIMER_FREQ: Frequency = Frequency::new(100);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pit_divisor_rounds_to_nearest() {
        assert_eq!(Frequency::new(100).pit_divisor(), 11932);
        assert_eq!(Frequency::new(1000).pit_divisor(), 1193);
        assert_eq!(Frequency::new(19).pit_divisor(), 62799);
    }

    #[test]
    fn test_tick_length() {
        assert_eq!(TIMER_FREQ.tick_nanos(), 10_000_000);
        assert_eq!(Frequency::new(1000).tick_nanos(), 1_000_000);
    }

    #[test]
    #[should_panic]
    fn test_frequency_below_range() {
        let _ = Frequency::new(18);
    }

    #[test]
    #[should_panic]
    fn test_frequency_above_range() {
        let _ = Frequency::new(1001);
    }
}

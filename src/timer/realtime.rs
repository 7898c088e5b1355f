/*
 * Real-Time Delays
 *
 * `msleep`/`usleep`/`nsleep` all sleep for NUM/DENOM seconds. Delays of
 * at least one whole tick go through the sleep queue and give up the CPU;
 * shorter ones spin in `busy_wait` for a count scaled from
 * `loops_per_tick`.
 *
 *   (NUM / DENOM) s
 *   ---------------------- = NUM * F / DENOM ticks
 *   1 s / F ticks
 */

use crate::config::Frequency;

pub const MILLIS_PER_SEC: i32 = 1_000;
pub const MICROS_PER_SEC: i32 = 1_000_000;
pub const NANOS_PER_SEC: i32 = 1_000_000_000;

/// How a real-time delay is served
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delay {
    /// Block on the sleep queue for this many ticks
    Ticks(i64),

    /// Spin for this many `busy_wait` iterations
    Spin(i64),
}

impl Delay {
    /// Decide how to wait `num / denom` seconds at tick rate `freq`
    ///
    /// Non-positive delays return at once.
    ///
    /// `denom` must be a multiple of 1000: the spin count is computed with
    /// numerator and denominator both scaled down by 1000 so the
    /// intermediate product does not overflow.
    pub fn plan(num: i64, denom: i32, freq: Frequency, loops_per_tick: u32) -> Self {
        if num <= 0 {
            return Delay::Spin(0);
        }

        let hz = freq.hz() as i64;
        let ticks = num.saturating_mul(hz) / denom as i64;
        if ticks > 0 {
            return Delay::Ticks(ticks);
        }

        debug_assert!(denom % 1000 == 0, "denominator {} not divisible by 1000", denom);
        let loops = loops_per_tick as i64 * num / 1000 * hz / (denom as i64 / 1000);
        Delay::Spin(loops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TIMER_FREQ;

    #[test]
    fn test_whole_ticks_use_sleep_queue() {
        assert_eq!(Delay::plan(10_000, MICROS_PER_SEC, TIMER_FREQ, 0), Delay::Ticks(1));
        assert_eq!(Delay::plan(250, MILLIS_PER_SEC, TIMER_FREQ, 0), Delay::Ticks(25));
        assert_eq!(Delay::plan(2, 1, TIMER_FREQ, 0), Delay::Ticks(200));
    }

    #[test]
    fn test_sub_tick_spins() {
        // 500us at 100Hz is 1/20 of a tick
        assert_eq!(
            Delay::plan(500, MICROS_PER_SEC, TIMER_FREQ, 1_000_000),
            Delay::Spin(50_000)
        );
        // 9.999ms rounds down to zero ticks
        assert!(matches!(
            Delay::plan(9_999, MICROS_PER_SEC, TIMER_FREQ, 1_000_000),
            Delay::Spin(_)
        ));
        assert_eq!(
            Delay::plan(5_000_000, NANOS_PER_SEC, TIMER_FREQ, 2_000_000),
            Delay::Spin(1_000_000)
        );
    }

    #[test]
    fn test_non_positive_delays_do_nothing() {
        for num in [0, -3, -10_000_000_000_000, i64::MIN] {
            for denom in [MILLIS_PER_SEC, MICROS_PER_SEC, NANOS_PER_SEC] {
                assert_eq!(
                    Delay::plan(num, denom, TIMER_FREQ, u32::MAX),
                    Delay::Spin(0)
                );
            }
        }
    }

    #[test]
    fn test_plan_at_high_frequency() {
        let freq = Frequency::new(1000);
        assert_eq!(Delay::plan(1, MILLIS_PER_SEC, freq, 0), Delay::Ticks(1));
        assert_eq!(
            Delay::plan(500, MICROS_PER_SEC, freq, 10_000),
            Delay::Spin(5_000)
        );
    }
}

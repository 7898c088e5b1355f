use bitflags::bitflags;
use x86_64::instructions::port::Port;

use crate::config::Frequency;
use crate::scheduler::traits::IntervalTimer;

const PIT_CHANNEL_0: u16 = 0x40;
const PIT_COMMAND: u16 = 0x43;

bitflags! {
    /// Mode/command register (port 0x43)
    ///
    /// Channel select lives in bits 6-7; channel 0 is all zeros.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PitCommand: u8 {
        const BCD = 1;
        const MODE_RATE_GENERATOR = 0b010 << 1;
        const MODE_SQUARE_WAVE = 0b011 << 1;
        const ACCESS_LOBYTE = 0b01 << 4;
        const ACCESS_HIBYTE = 0b10 << 4;
        const ACCESS_LOHI = Self::ACCESS_LOBYTE.bits() | Self::ACCESS_HIBYTE.bits();
    }
}

/// Command used for the tick: channel 0, low then high byte, mode 2, binary
pub const TICK_COMMAND: PitCommand =
    PitCommand::ACCESS_LOHI.union(PitCommand::MODE_RATE_GENERATOR);

/// The 8254 Programmable Interval Timer, channel 0
///
/// Channel 0 raises IRQ0 on every period of the rate generator.
pub struct Pit {
    channel_0: Port<u8>,
    command: Port<u8>,
}

impl Pit {
    pub const fn new() -> Self {
        Self {
            channel_0: Port::new(PIT_CHANNEL_0),
            command: Port::new(PIT_COMMAND),
        }
    }

    pub fn set_divisor(&mut self, divisor: u16) {
        unsafe {
            self.command.write(TICK_COMMAND.bits());

            // Low byte first, then high byte
            self.channel_0.write((divisor & 0xFF) as u8);
            self.channel_0.write((divisor >> 8) as u8);
        }
    }
}

impl IntervalTimer for Pit {
    fn program(&mut self, freq: Frequency) {
        let divisor = freq.pit_divisor();
        log::info!("Initializing PIT with {} (divisor: {})", freq, divisor);
        self.set_divisor(divisor);
    }
}

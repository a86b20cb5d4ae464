//! 8253/8254 PIT channel 0, the source of IRQ0.

use x86_64::instructions::port::Port;

const CHANNEL0_DATA: u16 = 0x40;
const COMMAND: u16 = 0x43;

/// Input clock of the PIT in Hz.
const BASE_FREQUENCY: u32 = 1_193_182;

/// Channel 0, lobyte/hibyte, mode 3 (square wave), binary.
const CMD_CHANNEL0_SQUARE_WAVE: u8 = 0x36;

/// Divisor for `rate` Hz, clamped to what the 16-bit counter can hold.
pub fn divisor(rate: u32) -> u16 {
    (BASE_FREQUENCY / rate.max(1)).clamp(1, u16::MAX as u32) as u16
}

/// Programs channel 0 to fire at `rate` Hz. Returns the divisor actually used.
pub fn init(rate: u32) -> u16 {
    let divisor = divisor(rate);
    let mut command = Port::<u8>::new(COMMAND);
    let mut data = Port::<u8>::new(CHANNEL0_DATA);

    unsafe {
        command.write(CMD_CHANNEL0_SQUARE_WAVE);
        data.write((divisor & 0xFF) as u8);
        data.write((divisor >> 8) as u8);
    }
    divisor
}

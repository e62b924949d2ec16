//! Register map and chip constants

/// Factory default 7-bit slave address.
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Mode register 1.
pub const MODE1: u8 = 0x00;
/// Clock prescaler; writable only while asleep.
pub const PRESCALE: u8 = 0xfe;
/// First channel register (channel 0, on-tick low byte).
pub const LED0_ON_L: u8 = 0x06;

/// MODE1 restart bit.
pub const MODE1_RESTART: u8 = 0x80;
/// MODE1 low-power sleep bit.
pub const MODE1_SLEEP: u8 = 0x10;

/// Internal oscillator frequency.
pub const OSCILLATOR_HZ: f64 = 25_000_000.0;
/// Ticks per PWM cycle.
pub const PWM_STEPS: u16 = 4096;
/// Largest programmable tick.
pub const MAX_TICK: u16 = PWM_STEPS - 1;
/// Output channels.
pub const CHANNEL_COUNT: u8 = 16;

/// Smallest prescaler the chip accepts.
pub const PRESCALE_MIN: u8 = 3;

/// The four registers of `channel`: on-low, on-high, off-low, off-high.
///
/// Returns `None` for channels outside 0..16.
pub fn channel_registers(channel: u8) -> Option<[u8; 4]> {
    if channel >= CHANNEL_COUNT {
        return None;
    }
    let base = LED0_ON_L + 4 * channel;
    Some([base, base + 1, base + 2, base + 3])
}

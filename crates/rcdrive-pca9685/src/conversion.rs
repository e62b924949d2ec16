//! Pure tick, pulse and prescaler arithmetic

use crate::registers::{MAX_TICK, PRESCALE_MIN, PWM_STEPS};
use crate::{DriverError, DriverResult};

/// Prescaler producing `frequency_hz` from an `oscillator_hz` clock:
/// `round(oscillator / (4096 * frequency)) - 1`.
///
/// # Errors
///
/// [`DriverError::InvalidFrequency`] if the frequency is not positive or
/// the prescaler falls outside 3..=255 (roughly 24..=1526 Hz at 25 MHz).
pub fn prescale_for(frequency_hz: f64, oscillator_hz: f64) -> DriverResult<u8> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(DriverError::InvalidFrequency(frequency_hz));
    }

    let prescale = (oscillator_hz / (f64::from(PWM_STEPS) * frequency_hz)).round() - 1.0;
    if !(f64::from(PRESCALE_MIN)..=f64::from(u8::MAX)).contains(&prescale) {
        return Err(DriverError::InvalidFrequency(frequency_hz));
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "range checked above"
    )]
    let prescale = prescale as u8;
    Ok(prescale)
}

/// Length of one PWM cycle in microseconds.
pub fn cycle_us(frequency_hz: f64) -> f64 {
    1_000_000.0 / frequency_hz
}

/// Ticks high for a `pulse_us` pulse, rounded to nearest and clamped to
/// `0..=4095`.
pub fn microseconds_to_duty(pulse_us: f64, frequency_hz: f64) -> u16 {
    let ticks = (pulse_us / cycle_us(frequency_hz) * f64::from(PWM_STEPS) + 0.5).floor();
    if ticks.is_nan() {
        return 0;
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "clamped to the 12-bit tick range"
    )]
    let duty = ticks.clamp(0.0, f64::from(MAX_TICK)) as u16;
    duty
}

/// Pulse width in microseconds for `duty` ticks.
pub fn duty_to_microseconds(duty: u16, frequency_hz: f64) -> f64 {
    f64::from(duty) / f64::from(PWM_STEPS) * cycle_us(frequency_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescale_at_50hz() -> DriverResult<()> {
        // 25e6 / (4096 * 50) = 122.07
        assert_eq!(prescale_for(50.0, 25_000_000.0)?, 121);
        Ok(())
    }

    #[test]
    fn test_prescale_bounds() {
        assert!(prescale_for(24.0, 25_000_000.0).ok().is_some());
        assert!(prescale_for(1526.0, 25_000_000.0).ok().is_some());
        assert!(prescale_for(2000.0, 25_000_000.0).err().is_some());
        assert!(prescale_for(20.0, 25_000_000.0).err().is_some());
        assert!(prescale_for(0.0, 25_000_000.0).err().is_some());
        assert!(prescale_for(f64::NAN, 25_000_000.0).err().is_some());
    }

    #[test]
    fn test_microseconds_to_duty() {
        // 20 ms cycle: 1 µs = 0.2048 ticks
        assert_eq!(microseconds_to_duty(1500.0, 50.0), 307);
        assert_eq!(microseconds_to_duty(1000.0, 50.0), 205);
        assert_eq!(microseconds_to_duty(2000.0, 50.0), 410);
        assert_eq!(microseconds_to_duty(0.0, 50.0), 0);
    }

    #[test]
    fn test_microseconds_to_duty_clamps() {
        assert_eq!(microseconds_to_duty(-50.0, 50.0), 0);
        assert_eq!(microseconds_to_duty(20_000.0, 50.0), 4095);
        assert_eq!(microseconds_to_duty(1e9, 50.0), 4095);
        assert_eq!(microseconds_to_duty(f64::NAN, 50.0), 0);
    }

    #[test]
    fn test_duty_to_microseconds() {
        assert!((duty_to_microseconds(2048, 50.0) - 10_000.0).abs() < 1e-9);
        assert!(duty_to_microseconds(0, 50.0).abs() < 1e-9);
    }
}

//! Recording PWM output

use std::sync::Arc;

use parking_lot::Mutex;
use rcdrive_errors::{BusError, DriverError};
use rcdrive_pca9685::registers::{CHANNEL_COUNT, MAX_TICK};
use rcdrive_pca9685::{DriverResult, PwmOutput, microseconds_to_duty};

/// One channel write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmWrite {
    /// Channel
    pub channel: u8,
    /// Rising tick
    pub on: u16,
    /// Falling tick
    pub off: u16,
}

#[derive(Debug, Default)]
struct RecordingState {
    writes: Vec<PwmWrite>,
    fail: bool,
}

/// [`PwmOutput`] that records writes instead of touching a bus.
///
/// Validates channels and ticks like the real driver and converts pulse
/// widths at a fixed frequency (50 Hz by default).
#[derive(Debug, Clone)]
pub struct RecordingOutput {
    frequency_hz: f64,
    state: Arc<Mutex<RecordingState>>,
}

impl Default for RecordingOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingOutput {
    /// 50 Hz output.
    pub fn new() -> Self {
        Self::with_frequency(50.0)
    }

    /// Output converting at `frequency_hz`.
    pub fn with_frequency(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            state: Arc::new(Mutex::new(RecordingState::default())),
        }
    }

    /// Every write so far.
    pub fn writes(&self) -> Vec<PwmWrite> {
        self.state.lock().writes.clone()
    }

    /// Most recent write, if any.
    pub fn last(&self) -> Option<PwmWrite> {
        self.state.lock().writes.last().copied()
    }

    /// Most recent `off` tick written to `channel`.
    pub fn last_off(&self, channel: u8) -> Option<u16> {
        self.state
            .lock()
            .writes
            .iter()
            .rev()
            .find(|w| w.channel == channel)
            .map(|w| w.off)
    }

    /// Forget recorded writes.
    pub fn clear(&self) {
        self.state.lock().writes.clear();
    }

    /// Make subsequent writes fail with a bus transfer error.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail = fail;
    }
}

impl PwmOutput for RecordingOutput {
    fn set_channel_pwm(&self, channel: u8, on: u16, off: u16) -> DriverResult<()> {
        if channel >= CHANNEL_COUNT {
            return Err(DriverError::InvalidChannel(channel));
        }
        if on > MAX_TICK || off > MAX_TICK {
            return Err(DriverError::TickOutOfRange { value: on.max(off) });
        }

        let mut state = self.state.lock();
        if state.fail {
            return Err(BusError::transfer(0x06, "injected failure").into());
        }
        state.writes.push(PwmWrite { channel, on, off });
        Ok(())
    }

    fn microseconds_to_duty(&self, pulse_us: f64) -> u16 {
        microseconds_to_duty(pulse_us, self.frequency_hz)
    }
}

//! PCA9685 register sequencing

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rcdrive_i2c::I2cBus;
use tracing::{debug, error, info, warn};

use crate::conversion;
use crate::registers::{
    MAX_TICK, MODE1, MODE1_RESTART, MODE1_SLEEP, PRESCALE, channel_registers,
};
use crate::{DriverConfig, DriverError, DriverResult};

const CLOCK_SETTLE: Duration = Duration::from_millis(1);
const RESTART_SETTLE: Duration = Duration::from_millis(5);

/// A PWM output stage: channel writes plus the pulse-to-tick conversion
/// matching its current frequency.
pub trait PwmOutput: Send + Sync {
    /// Program `channel` to rise at `on` and fall at `off` ticks.
    ///
    /// # Errors
    ///
    /// Driver-specific; see [`Pca9685::set_channel_pwm`].
    fn set_channel_pwm(&self, channel: u8, on: u16, off: u16) -> DriverResult<()>;

    /// Ticks for a pulse of `pulse_us` at the current frequency.
    fn microseconds_to_duty(&self, pulse_us: f64) -> u16;
}

#[derive(Debug)]
struct DriverState {
    ready: bool,
    frequency_hz: f64,
}

/// PCA9685 on a shared bus.
#[derive(Debug)]
pub struct Pca9685 {
    bus: Arc<I2cBus>,
    config: DriverConfig,
    state: Mutex<DriverState>,
}

impl Pca9685 {
    /// Create an uninitialized driver. Nothing is sent until [`init`](Self::init).
    pub fn new(bus: Arc<I2cBus>, config: DriverConfig) -> Self {
        let frequency_hz = config.frequency_hz;
        Self {
            bus,
            config,
            state: Mutex::new(DriverState {
                ready: false,
                frequency_hz,
            }),
        }
    }

    /// Open the bus, reset MODE1 and program the configured frequency.
    ///
    /// A second call on a ready driver returns immediately. If bring-up
    /// fails and this call opened the bus, the bus is closed again.
    ///
    /// # Errors
    ///
    /// The first bus error, or [`DriverError::InvalidFrequency`].
    pub fn init(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        if state.ready {
            debug!("PCA9685 already initialized");
            return Ok(());
        }

        let was_open = self.bus.is_open()?;
        if let Err(e) = self.bring_up() {
            error!("PCA9685 initialization failed: {e}");
            if !was_open && let Err(close_err) = self.bus.close() {
                warn!("failed to release I2C bus after init failure: {close_err}");
            }
            return Err(e);
        }

        state.frequency_hz = self.config.frequency_hz;
        state.ready = true;
        info!(
            address = self.config.address,
            frequency_hz = self.config.frequency_hz,
            "PCA9685 initialized"
        );
        Ok(())
    }

    fn bring_up(&self) -> DriverResult<()> {
        self.bus.open()?;
        self.bus.set_slave(self.config.address)?;
        self.bus.write_byte(MODE1, 0x00)?;
        thread::sleep(CLOCK_SETTLE);
        self.program_frequency(self.config.frequency_hz)
    }

    /// Reprogram the output frequency.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidFrequency`] before any bus access, or the first
    /// failing register access.
    pub fn set_frequency(&self, frequency_hz: f64) -> DriverResult<()> {
        let mut state = self.state.lock();
        self.program_frequency(frequency_hz)?;
        state.frequency_hz = frequency_hz;
        Ok(())
    }

    fn program_frequency(&self, frequency_hz: f64) -> DriverResult<()> {
        let prescale = conversion::prescale_for(frequency_hz, self.config.oscillator_hz)?;

        let old_mode = self.bus.read_byte(MODE1)?;
        let sleep_mode = (old_mode & !MODE1_RESTART) | MODE1_SLEEP;

        self.bus.write_byte(MODE1, sleep_mode)?;
        self.bus.write_byte(PRESCALE, prescale)?;
        self.bus.write_byte(MODE1, old_mode)?;
        thread::sleep(RESTART_SETTLE);
        self.bus.write_byte(MODE1, old_mode | MODE1_RESTART)?;

        debug!("PWM frequency set to {frequency_hz} Hz (prescale {prescale})");
        Ok(())
    }

    /// Program one channel's on and off ticks.
    ///
    /// # Errors
    ///
    /// [`DriverError::NotInitialized`], [`DriverError::InvalidChannel`] or
    /// [`DriverError::TickOutOfRange`] before any bus access; otherwise the
    /// first failing register write. Earlier writes are not rolled back.
    pub fn set_channel_pwm(&self, channel: u8, on: u16, off: u16) -> DriverResult<()> {
        if !self.is_ready() {
            error!("PWM write to channel {channel} before initialization");
            return Err(DriverError::NotInitialized);
        }
        let [on_l_reg, on_h_reg, off_l_reg, off_h_reg] =
            channel_registers(channel).ok_or(DriverError::InvalidChannel(channel))?;
        for value in [on, off] {
            if value > MAX_TICK {
                return Err(DriverError::TickOutOfRange { value });
            }
        }

        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.bus.write_byte(on_l_reg, on_l)?;
        self.bus.write_byte(on_h_reg, on_h)?;
        self.bus.write_byte(off_l_reg, off_l)?;
        self.bus.write_byte(off_h_reg, off_h)?;

        debug!("PWM channel {channel}: on {on}, off {off}");
        Ok(())
    }

    /// Close the bus and mark the driver uninitialized.
    ///
    /// # Errors
    ///
    /// A bus lock failure while closing.
    pub fn shutdown(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.ready = false;
        self.bus.close()?;
        info!("PCA9685 shut down");
        Ok(())
    }

    /// Whether [`init`](Self::init) has completed.
    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    /// Current output frequency.
    pub fn frequency(&self) -> f64 {
        self.state.lock().frequency_hz
    }

    /// Current cycle length in microseconds.
    pub fn cycle_us(&self) -> f64 {
        conversion::cycle_us(self.frequency())
    }

    /// Ticks for a pulse of `pulse_us`, clamped to `0..=4095`.
    pub fn microseconds_to_duty(&self, pulse_us: f64) -> u16 {
        conversion::microseconds_to_duty(pulse_us, self.frequency())
    }

    /// Pulse width in microseconds for `duty` ticks.
    pub fn duty_to_microseconds(&self, duty: u16) -> f64 {
        conversion::duty_to_microseconds(duty, self.frequency())
    }

    /// Driver configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The bus this driver writes through.
    pub fn bus(&self) -> &Arc<I2cBus> {
        &self.bus
    }
}

impl PwmOutput for Pca9685 {
    fn set_channel_pwm(&self, channel: u8, on: u16, off: u16) -> DriverResult<()> {
        Pca9685::set_channel_pwm(self, channel, on, off)
    }

    fn microseconds_to_duty(&self, pulse_us: f64) -> u16 {
        Pca9685::microseconds_to_duty(self, pulse_us)
    }
}

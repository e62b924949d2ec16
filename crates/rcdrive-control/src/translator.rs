//! Actuator commands to PWM writes

use std::sync::Arc;

use rcdrive_errors::DriverError;
use rcdrive_pca9685::registers::MAX_TICK;
use rcdrive_pca9685::{DriverResult, PwmOutput};
use tracing::{error, info};

use crate::actuator::{Actuator, ActuatorConfig};

/// Converts commands with the configured curves and writes them to a
/// [`PwmOutput`]. Every call is one channel write; failures propagate and
/// nothing is retried.
pub struct ActuatorTranslator {
    output: Arc<dyn PwmOutput>,
    config: ActuatorConfig,
}

impl std::fmt::Debug for ActuatorTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorTranslator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ActuatorTranslator {
    /// Translator writing to `output`.
    pub fn new(output: Arc<dyn PwmOutput>, config: ActuatorConfig) -> Self {
        Self { output, config }
    }

    /// Curves and channels in use.
    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Steer to `percent` (-100 full left, 100 full right). Returns the
    /// duty written.
    ///
    /// # Errors
    ///
    /// The output's error, unchanged.
    pub fn set_servo_direction(&self, percent: i32) -> DriverResult<u16> {
        let duty = self.config.steering.duty_for(percent);
        self.write(Actuator::Steering, duty)
    }

    /// Drive at `percent` (-100 full reverse, 0 stop, 100 full forward).
    ///
    /// # Errors
    ///
    /// The output's error, unchanged.
    pub fn set_motor_esc(&self, percent: i32) -> DriverResult<u16> {
        let duty = self.config.esc.duty_for(percent);
        self.write(Actuator::Esc, duty)
    }

    /// Move the camera pan servo to a pulse width.
    ///
    /// # Errors
    ///
    /// The output's error, unchanged.
    pub fn set_camera_pan(&self, pulse_us: f64) -> DriverResult<u16> {
        let duty = self.output.microseconds_to_duty(pulse_us);
        self.write(Actuator::CameraPan, duty)
    }

    /// Move the camera tilt servo to a pulse width.
    ///
    /// # Errors
    ///
    /// The output's error, unchanged.
    pub fn set_camera_tilt(&self, pulse_us: f64) -> DriverResult<u16> {
        let duty = self.output.microseconds_to_duty(pulse_us);
        self.write(Actuator::CameraTilt, duty)
    }

    /// Write `duty` ticks to `actuator`'s channel, bypassing its curve.
    ///
    /// # Errors
    ///
    /// [`DriverError::TickOutOfRange`] above 4095, otherwise the output's
    /// error.
    pub fn set_raw(&self, actuator: Actuator, duty: u16) -> DriverResult<u16> {
        if duty > MAX_TICK {
            return Err(DriverError::TickOutOfRange { value: duty });
        }
        self.write(actuator, duty)
    }

    /// Raw steering duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_servo_direction_raw(&self, duty: u16) -> DriverResult<u16> {
        self.set_raw(Actuator::Steering, duty)
    }

    /// Raw ESC duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_motor_esc_raw(&self, duty: u16) -> DriverResult<u16> {
        self.set_raw(Actuator::Esc, duty)
    }

    /// Raw camera pan duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_camera_pan_raw(&self, duty: u16) -> DriverResult<u16> {
        self.set_raw(Actuator::CameraPan, duty)
    }

    /// Raw camera tilt duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_camera_tilt_raw(&self, duty: u16) -> DriverResult<u16> {
        self.set_raw(Actuator::CameraTilt, duty)
    }

    fn write(&self, actuator: Actuator, duty: u16) -> DriverResult<u16> {
        let channel = self.config.channel(actuator);
        if self.config.dry_run {
            info!(%actuator, channel, duty, "dry run, duty not sent");
            return Ok(duty);
        }

        if let Err(e) = self.output.set_channel_pwm(channel, 0, duty) {
            error!(%actuator, channel, duty, "actuator write failed: {e}");
            return Err(e);
        }
        info!(%actuator, channel, duty, "duty sent");
        Ok(duty)
    }
}

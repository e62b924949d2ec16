//! Receiver channels to command percentages

use std::fmt;

use rcdrive_errors::ConfigError;
use rcdrive_receiver::config::{DEFAULT_MOTOR_GPIO, DEFAULT_SERVO_GPIO};
use rcdrive_receiver::{LossReason, PulseCapture, PulseReading, ReceiverError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::{CalibrationConfig, CalibrationRange};

/// Percentage reported for a channel without signal. Outside `[-100, 100]`.
pub const NO_SIGNAL_PERCENT: i32 = -101;

/// Receiver channels the vehicle listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Throttle, index 0
    Motor,
    /// Steering, index 1
    Servo,
}

impl Channel {
    /// Both channels in index order.
    pub const ALL: [Channel; 2] = [Channel::Motor, Channel::Servo];

    /// Channel for a numeric index.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::Motor),
            1 => Some(Channel::Servo),
            _ => None,
        }
    }

    /// Numeric index.
    pub fn index(self) -> usize {
        match self {
            Channel::Motor => 0,
            Channel::Servo => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Motor => write!(f, "motor"),
            Channel::Servo => write!(f, "servo"),
        }
    }
}

/// A mapped channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelReading {
    /// Command in `[-100, 100]`
    Percent(i32),
    /// No usable signal; hold the last safe command
    NoSignal(LossReason),
}

impl ChannelReading {
    /// The percentage, if there is signal.
    pub fn percent(self) -> Option<i32> {
        match self {
            ChannelReading::Percent(p) => Some(p),
            ChannelReading::NoSignal(_) => None,
        }
    }

    /// The percentage, or [`NO_SIGNAL_PERCENT`].
    pub fn as_percent(self) -> i32 {
        self.percent().unwrap_or(NO_SIGNAL_PERCENT)
    }

    /// Whether the channel has signal.
    pub fn has_signal(self) -> bool {
        matches!(self, ChannelReading::Percent(_))
    }
}

impl fmt::Display for ChannelReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelReading::Percent(p) => write!(f, "{p}%"),
            ChannelReading::NoSignal(reason) => write!(f, "no signal ({reason})"),
        }
    }
}

/// Which receiver lines carry which channel, and how they are calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Throttle input line
    pub motor_gpio: u32,
    /// Steering input line
    pub servo_gpio: u32,
    /// Pulse width ranges
    pub calibration: CalibrationConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            motor_gpio: DEFAULT_MOTOR_GPIO,
            servo_gpio: DEFAULT_SERVO_GPIO,
            calibration: CalibrationConfig::default(),
        }
    }
}

impl MapperConfig {
    /// Use `calibration`.
    pub fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    /// Read the channels from other lines.
    pub fn with_gpios(mut self, motor_gpio: u32, servo_gpio: u32) -> Self {
        self.motor_gpio = motor_gpio;
        self.servo_gpio = servo_gpio;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct MappedChannel {
    gpio: u32,
    range: CalibrationRange,
}

/// Polls a [`PulseCapture`] and converts widths to percentages.
#[derive(Debug, Clone)]
pub struct ChannelMapper {
    motor: MappedChannel,
    servo: MappedChannel,
}

impl ChannelMapper {
    /// Mapper for `config`'s lines and effective ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if either effective calibration range is
    /// empty or inverted.
    pub fn new(config: &MapperConfig) -> Result<Self, ConfigError> {
        config.calibration.validate()?;
        Ok(Self {
            motor: MappedChannel {
                gpio: config.motor_gpio,
                range: config.calibration.motor_range(),
            },
            servo: MappedChannel {
                gpio: config.servo_gpio,
                range: config.calibration.servo_range(),
            },
        })
    }

    fn mapped(&self, channel: Channel) -> &MappedChannel {
        match channel {
            Channel::Motor => &self.motor,
            Channel::Servo => &self.servo,
        }
    }

    /// Receiver line for `channel`.
    pub fn gpio(&self, channel: Channel) -> u32 {
        self.mapped(channel).gpio
    }

    /// Calibration range for `channel`.
    pub fn range(&self, channel: Channel) -> CalibrationRange {
        self.mapped(channel).range
    }

    /// Convert an already taken reading.
    pub fn map_reading(&self, channel: Channel, reading: PulseReading) -> ChannelReading {
        match reading {
            PulseReading::Valid(width) => ChannelReading::Percent(self.range(channel).percent(width)),
            PulseReading::Lost(reason) => ChannelReading::NoSignal(reason),
        }
    }

    /// Read and convert `channel`.
    ///
    /// # Errors
    ///
    /// Only if the capture itself fails; signal loss is a
    /// [`ChannelReading::NoSignal`].
    pub fn read(
        &self,
        capture: &dyn PulseCapture,
        channel: Channel,
    ) -> Result<ChannelReading, ReceiverError> {
        let reading = capture.read_pulse(self.gpio(channel))?;
        let mapped = self.map_reading(channel, reading);
        debug!(%channel, %reading, %mapped, "channel read");
        Ok(mapped)
    }

    /// Read a channel by index. Unknown indices have no signal.
    ///
    /// # Errors
    ///
    /// As for [`read`](Self::read).
    pub fn read_index(
        &self,
        capture: &dyn PulseCapture,
        index: usize,
    ) -> Result<ChannelReading, ReceiverError> {
        match Channel::from_index(index) {
            Some(channel) => self.read(capture, channel),
            None => Ok(ChannelReading::NoSignal(LossReason::Unmapped)),
        }
    }

    /// Read a channel as a bare percentage, [`NO_SIGNAL_PERCENT`] when lost.
    ///
    /// # Errors
    ///
    /// As for [`read`](Self::read).
    pub fn read_percent(
        &self,
        capture: &dyn PulseCapture,
        channel: Channel,
    ) -> Result<i32, ReceiverError> {
        self.read(capture, channel).map(ChannelReading::as_percent)
    }
}

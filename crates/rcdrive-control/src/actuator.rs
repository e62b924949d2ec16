//! Actuator calibration curves and channel assignment

use std::collections::BTreeMap;
use std::fmt;

use rcdrive_errors::ConfigError;
use rcdrive_pca9685::registers::{CHANNEL_COUNT, MAX_TICK};
use serde::{Deserialize, Serialize};

use crate::interp::{clamp_percent, lerp, round_i32};

/// Outputs the translator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Actuator {
    /// Steering servo
    Steering,
    /// Motor speed controller
    Esc,
    /// Camera horizontal servo
    CameraPan,
    /// Camera vertical servo
    CameraTilt,
}

impl Actuator {
    /// Every actuator.
    pub const ALL: [Actuator; 4] = [
        Actuator::Steering,
        Actuator::Esc,
        Actuator::CameraPan,
        Actuator::CameraTilt,
    ];
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actuator::Steering => write!(f, "steering"),
            Actuator::Esc => write!(f, "esc"),
            Actuator::CameraPan => write!(f, "camera-pan"),
            Actuator::CameraTilt => write!(f, "camera-tilt"),
        }
    }
}

fn percent_to_tick(value: f64) -> u16 {
    u16::try_from(round_i32(value).clamp(0, i32::from(MAX_TICK))).unwrap_or(MAX_TICK)
}

/// Steering: one linear range, -100 % full left at `min_duty`, +100 % full
/// right at `max_duty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringCurve {
    /// Output channel
    pub channel: u8,
    /// Duty at -100 %
    pub min_duty: u16,
    /// Duty at +100 %
    pub max_duty: u16,
}

impl Default for SteeringCurve {
    fn default() -> Self {
        Self {
            channel: 0,
            min_duty: 250,
            max_duty: 375,
        }
    }
}

impl SteeringCurve {
    /// Duty for an angle percentage, clamped to `[-100, 100]` first.
    pub fn duty_for(&self, percent: i32) -> u16 {
        percent_to_tick(lerp(
            f64::from(clamp_percent(percent)),
            -100.0,
            100.0,
            f64::from(self.min_duty),
            f64::from(self.max_duty),
        ))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_duty >= self.max_duty {
            return Err(ConfigError::invalid(
                "actuators.steering",
                format!("min_duty {} must be below max_duty {}", self.min_duty, self.max_duty),
            ));
        }
        if self.max_duty > MAX_TICK {
            return Err(ConfigError::invalid(
                "actuators.steering.max_duty",
                format!("{} exceeds {MAX_TICK}", self.max_duty),
            ));
        }
        Ok(())
    }
}

/// Speed controller: two linear ranges meeting at a fixed neutral duty.
///
/// Reverse maps `-100..0` onto `min_duty..neutral_duty`, forward maps
/// `0..100` onto `neutral_duty..max_duty`, and 0 is exactly
/// `neutral_duty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscCurve {
    /// Output channel
    pub channel: u8,
    /// Duty at full reverse
    pub min_duty: u16,
    /// Duty at stop
    pub neutral_duty: u16,
    /// Duty at full forward
    pub max_duty: u16,
}

impl Default for EscCurve {
    fn default() -> Self {
        Self {
            channel: 1,
            min_duty: 140,
            neutral_duty: 400,
            max_duty: 535,
        }
    }
}

impl EscCurve {
    /// Duty for a speed percentage, clamped to `[-100, 100]` first.
    pub fn duty_for(&self, percent: i32) -> u16 {
        let percent = clamp_percent(percent);
        let neutral = f64::from(self.neutral_duty);
        match percent {
            0 => self.neutral_duty,
            p if p > 0 => percent_to_tick(lerp(
                f64::from(p),
                0.0,
                100.0,
                neutral,
                f64::from(self.max_duty),
            )),
            p => percent_to_tick(lerp(
                f64::from(p),
                -100.0,
                0.0,
                f64::from(self.min_duty),
                neutral,
            )),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_duty < self.neutral_duty && self.neutral_duty < self.max_duty) {
            return Err(ConfigError::invalid(
                "actuators.esc",
                format!(
                    "neutral_duty {} must lie strictly between min_duty {} and max_duty {}",
                    self.neutral_duty, self.min_duty, self.max_duty
                ),
            ));
        }
        if self.max_duty > MAX_TICK {
            return Err(ConfigError::invalid(
                "actuators.esc.max_duty",
                format!("{} exceeds {MAX_TICK}", self.max_duty),
            ));
        }
        Ok(())
    }
}

/// Camera gimbal channels. Commands are pulse widths, converted at the
/// driver's frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal servo channel
    pub pan_channel: u8,
    /// Vertical servo channel
    pub tilt_channel: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_channel: 3,
            tilt_channel: 2,
        }
    }
}

/// Every actuator's channel and curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Steering servo
    pub steering: SteeringCurve,
    /// Motor speed controller
    pub esc: EscCurve,
    /// Camera gimbal
    pub camera: CameraConfig,
    /// Compute and log duties without writing them
    pub dry_run: bool,
}

impl ActuatorConfig {
    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Output channel driving `actuator`.
    pub fn channel(&self, actuator: Actuator) -> u8 {
        match actuator {
            Actuator::Steering => self.steering.channel,
            Actuator::Esc => self.esc.channel,
            Actuator::CameraPan => self.camera.pan_channel,
            Actuator::CameraTilt => self.camera.tilt_channel,
        }
    }

    /// Check curves and channel assignment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an empty steering range, an ESC neutral
    /// outside its range, a channel above 15 or two actuators sharing a
    /// channel.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.steering.validate()?;
        self.esc.validate()?;

        let mut owners: BTreeMap<u8, Actuator> = BTreeMap::new();
        for actuator in Actuator::ALL {
            let channel = self.channel(actuator);
            if channel >= CHANNEL_COUNT {
                return Err(ConfigError::invalid(
                    format!("actuators.{actuator}.channel"),
                    format!("{channel} out of range (0-15)"),
                ));
            }
            if let Some(other) = owners.insert(channel, actuator) {
                return Err(ConfigError::invalid(
                    format!("actuators.{actuator}.channel"),
                    format!("channel {channel} already used by {other}"),
                ));
            }
        }
        Ok(())
    }
}

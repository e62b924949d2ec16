//! Receiver channel calibration
//!
//! Each receiver channel sweeps a pulse width range that depends on the
//! transmitter trims and on the receiver itself. A [`CalibrationRange`]
//! maps that range affinely onto `[-100, 100]` percent.

use rcdrive_errors::ConfigError;
use serde::{Deserialize, Serialize};

use crate::interp::{PERCENT_MAX, PERCENT_MIN, clamp_percent, lerp, round_i32};

/// A channel's pulse width sweep, full reverse/left to full forward/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationRange {
    /// Pulse width at -100 %
    pub min_us: u32,
    /// Pulse width at +100 %
    pub max_us: u32,
}

impl CalibrationRange {
    /// Range from `min_us` to `max_us`.
    pub const fn new(min_us: u32, max_us: u32) -> Self {
        Self { min_us, max_us }
    }

    /// Clamp a measured width into the range. An inverted range clamps to
    /// `max_us`; [`validate`](Self::validate) rejects such ranges.
    pub fn clamp(&self, width_us: u32) -> u32 {
        width_us.max(self.min_us).min(self.max_us)
    }

    /// Percentage for a measured width, saturating at the range bounds.
    ///
    /// ```
    /// use rcdrive_control::CalibrationRange;
    ///
    /// let range = CalibrationRange::new(1000, 2000);
    /// assert_eq!(range.percent(1500), 0);
    /// assert_eq!(range.percent(2500), 100);
    /// assert_eq!(range.percent(1250), -50);
    /// ```
    pub fn percent(&self, width_us: u32) -> i32 {
        let width = self.clamp(width_us);
        let value = lerp(
            f64::from(width),
            f64::from(self.min_us),
            f64::from(self.max_us),
            f64::from(PERCENT_MIN),
            f64::from(PERCENT_MAX),
        );
        clamp_percent(round_i32(value))
    }

    /// Check the range is non-empty.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for `field` if `min_us >= max_us`.
    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.min_us >= self.max_us {
            return Err(ConfigError::invalid(
                field,
                format!("min_us {} must be below max_us {}", self.min_us, self.max_us),
            ));
        }
        Ok(())
    }
}

/// Known receiver hardware revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReceiverProfile {
    /// The receiver shipped with the car
    #[default]
    Standard,
    /// The "patator" receiver
    Patator,
}

impl ReceiverProfile {
    /// Throttle channel range.
    pub const fn motor(self) -> CalibrationRange {
        match self {
            ReceiverProfile::Standard => CalibrationRange::new(955, 2120),
            ReceiverProfile::Patator => CalibrationRange::new(965, 2005),
        }
    }

    /// Steering channel range.
    pub const fn servo(self) -> CalibrationRange {
        match self {
            ReceiverProfile::Standard => CalibrationRange::new(985, 2180),
            ReceiverProfile::Patator => CalibrationRange::new(1005, 2030),
        }
    }
}

impl std::fmt::Display for ReceiverProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiverProfile::Standard => write!(f, "standard"),
            ReceiverProfile::Patator => write!(f, "patator"),
        }
    }
}

/// A receiver profile, optionally overridden per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Base ranges
    pub profile: ReceiverProfile,
    /// Throttle range override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motor: Option<CalibrationRange>,
    /// Steering range override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servo: Option<CalibrationRange>,
}

impl CalibrationConfig {
    /// Profile ranges with no overrides.
    pub fn from_profile(profile: ReceiverProfile) -> Self {
        Self {
            profile,
            motor: None,
            servo: None,
        }
    }

    /// Override the throttle range.
    pub fn with_motor(mut self, range: CalibrationRange) -> Self {
        self.motor = Some(range);
        self
    }

    /// Override the steering range.
    pub fn with_servo(mut self, range: CalibrationRange) -> Self {
        self.servo = Some(range);
        self
    }

    /// Effective throttle range.
    pub fn motor_range(&self) -> CalibrationRange {
        self.motor.unwrap_or_else(|| self.profile.motor())
    }

    /// Effective steering range.
    pub fn servo_range(&self) -> CalibrationRange {
        self.servo.unwrap_or_else(|| self.profile.servo())
    }

    /// Check both effective ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an empty range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motor_range().validate("calibration.motor")?;
        self.servo_range().validate("calibration.servo")
    }
}

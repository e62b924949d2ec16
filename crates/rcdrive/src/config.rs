//! Vehicle configuration
//!
//! One YAML document configures every layer. Missing fields take the
//! defaults of the stock car: PCA9685 at `0x40` on `/dev/i2c-1`, receiver
//! on `/dev/gpiochip4` lines 24 (throttle) and 23 (steering).
//!
//! ```yaml
//! driver:
//!   frequency_hz: 50
//! receiver:
//!   backend: alerts
//! mapping:
//!   calibration:
//!     profile: patator
//! actuators:
//!   dry_run: true
//! logging:
//!   level: debug
//! ```

use std::path::Path;

use rcdrive_control::{ActuatorConfig, MapperConfig};
use rcdrive_errors::{ConfigError, ReceiverError};
use rcdrive_i2c::BusConfig;
use rcdrive_pca9685::DriverConfig;
use rcdrive_receiver::ReceiverConfig;
use rcdrive_tracing::LogConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Complete configuration of the control chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// I2C bus device
    pub bus: BusConfig,
    /// PWM output chip
    pub driver: DriverConfig,
    /// Receiver capture
    pub receiver: ReceiverConfig,
    /// Which lines carry which channel, and their calibration
    pub mapping: MapperConfig,
    /// Actuator channels and curves
    pub actuators: ActuatorConfig,
    /// Log output
    pub logging: LogConfig,
}

impl VehicleConfig {
    /// Parse and validate YAML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed YAML, [`ConfigError::Invalid`]
    /// if validation fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as for
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("loaded configuration from {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Use `receiver` for capture.
    pub fn with_receiver(mut self, receiver: ReceiverConfig) -> Self {
        self.receiver = receiver;
        self
    }

    /// Use `mapping` for channel assignment.
    pub fn with_mapping(mut self, mapping: MapperConfig) -> Self {
        self.mapping = mapping;
        self
    }

    /// Use `actuators` for output.
    pub fn with_actuators(mut self, actuators: ActuatorConfig) -> Self {
        self.actuators = actuators;
        self
    }

    /// Check every section and the links between them.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.device.as_os_str().is_empty() {
            return Err(ConfigError::invalid("bus.device", "must not be empty"));
        }
        self.driver.validate()?;
        self.receiver.validate().map_err(|e| match e {
            ReceiverError::InvalidConfig(reason) => ConfigError::invalid("receiver", reason),
            other => ConfigError::invalid("receiver", other.to_string()),
        })?;

        let gpios = self.receiver.gpios();
        for (field, gpio) in [
            ("mapping.motor_gpio", self.mapping.motor_gpio),
            ("mapping.servo_gpio", self.mapping.servo_gpio),
        ] {
            if !gpios.contains(&gpio) {
                return Err(ConfigError::invalid(
                    field,
                    format!("GPIO {gpio} is not a receiver line"),
                ));
            }
        }
        if self.mapping.motor_gpio == self.mapping.servo_gpio {
            return Err(ConfigError::invalid(
                "mapping",
                "motor and servo must use different lines",
            ));
        }
        self.mapping.calibration.validate()?;
        self.actuators.validate()?;
        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid("logging", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcdrive_receiver::LineConfig;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(VehicleConfig::default().validate().ok(), Some(()));
    }

    #[test]
    fn test_mapping_must_name_receiver_lines() {
        let config = VehicleConfig::default().with_receiver(ReceiverConfig::new(
            "/dev/gpiochip4",
            vec![LineConfig::new(24)],
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "mapping.servo_gpio"
        ));
    }

    #[test]
    fn test_same_line_for_both_channels() {
        let config =
            VehicleConfig::default().with_mapping(MapperConfig::default().with_gpios(24, 24));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "mapping"
        ));
    }

    #[test]
    fn test_receiver_errors_become_config_errors() {
        let config = VehicleConfig::default()
            .with_receiver(ReceiverConfig::new("/dev/gpiochip4", Vec::new()));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "receiver"
        ));
    }
}

//! Driver configuration

use rcdrive_errors::ConfigError;
use serde::{Deserialize, Serialize};

use crate::registers::{DEFAULT_ADDRESS, OSCILLATOR_HZ};

/// Lowest output frequency accepted by configuration.
pub const MIN_FREQUENCY_HZ: f64 = 24.0;
/// Highest output frequency accepted by configuration.
pub const MAX_FREQUENCY_HZ: f64 = 1526.0;

/// PCA9685 addressing and clock setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// 7-bit slave address
    pub address: u8,
    /// Output frequency; 50 Hz suits analog servos and ESCs
    pub frequency_hz: f64,
    /// Internal oscillator frequency
    pub oscillator_hz: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            frequency_hz: 50.0,
            oscillator_hz: OSCILLATOR_HZ,
        }
    }
}

impl DriverConfig {
    /// Set the slave address.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the output frequency.
    pub fn with_frequency(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Check address and frequency ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address > 0x7f {
            return Err(ConfigError::invalid(
                "driver.address",
                format!("{:#04x} is not a 7-bit address", self.address),
            ));
        }
        if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(ConfigError::invalid(
                "driver.frequency_hz",
                format!(
                    "{} Hz outside {MIN_FREQUENCY_HZ}..={MAX_FREQUENCY_HZ}",
                    self.frequency_hz
                ),
            ));
        }
        if !self.oscillator_hz.is_finite() || self.oscillator_hz <= 0.0 {
            return Err(ConfigError::invalid(
                "driver.oscillator_hz",
                "must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DriverConfig::default();
        assert_eq!(config.address, 0x40);
        assert!(config.validate().ok().is_some());
    }

    #[test]
    fn test_frequency_range() {
        assert!(DriverConfig::default().with_frequency(24.0).validate().ok().is_some());
        assert!(DriverConfig::default().with_frequency(1526.0).validate().ok().is_some());
        assert!(DriverConfig::default().with_frequency(23.0).validate().err().is_some());
        assert!(DriverConfig::default().with_frequency(1600.0).validate().err().is_some());
    }

    #[test]
    fn test_address_must_be_7_bit() {
        assert!(DriverConfig::default().with_address(0x80).validate().err().is_some());
    }
}

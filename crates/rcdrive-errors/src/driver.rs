//! PWM output chip errors.

use crate::bus::BusError;
use crate::common::ErrorSeverity;

/// Errors raised by the PCA9685-class PWM driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Channel writes were attempted before `init()` completed.
    #[error("PWM driver not initialized")]
    NotInitialized,

    /// Channel index outside 0..16.
    #[error("PWM channel {0} out of range (0-15)")]
    InvalidChannel(u8),

    /// Tick value outside the 12-bit counter range.
    #[error("PWM tick value {value} out of range (0-4095)")]
    TickOutOfRange {
        /// Rejected tick value
        value: u16,
    },

    /// Requested output frequency cannot be produced by the prescaler.
    #[error("PWM frequency {0} Hz cannot be programmed")]
    InvalidFrequency(f64),

    /// Underlying bus failure.
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl DriverError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DriverError::Bus(e) => e.severity(),
            _ => ErrorSeverity::Error,
        }
    }
}

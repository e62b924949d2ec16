//! I2C bus access errors.

use crate::common::ErrorSeverity;

/// Errors raised by the shared I2C bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// A transaction was attempted before the bus was opened.
    #[error("I2C bus not initialized")]
    NotInitialized,

    /// The device accepted fewer bytes than requested, or the transfer failed.
    #[error("I2C transfer failed at register {register:#04x}: {reason}")]
    Transfer {
        /// Register involved in the failed transaction
        register: u8,
        /// What went wrong
        reason: String,
    },

    /// The bus lock could not be acquired or was poisoned.
    #[error("I2C bus lock failed during {context}")]
    Lock {
        /// Operation that attempted to take the lock
        context: &'static str,
    },

    /// The bus device node could not be opened.
    #[error("I2C device {device} unavailable: {reason}")]
    DeviceUnavailable {
        /// Device node path
        device: String,
        /// Underlying failure
        reason: String,
    },

    /// The kernel refused the slave address.
    #[error("I2C slave address {address:#04x} rejected: {reason}")]
    AddressRejected {
        /// 7-bit slave address
        address: u8,
        /// Underlying failure
        reason: String,
    },
}

impl BusError {
    /// Get the error severity. Lock failures are fatal.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BusError::Lock { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create a transfer error for a register.
    pub fn transfer(register: u8, reason: impl Into<String>) -> Self {
        BusError::Transfer {
            register,
            reason: reason.into(),
        }
    }

    /// Create a short-transfer error describing the byte counts.
    pub fn short_transfer(register: u8, expected: usize, actual: usize) -> Self {
        BusError::Transfer {
            register,
            reason: format!("expected {expected} bytes, transferred {actual}"),
        }
    }

    /// Create a device unavailable error.
    pub fn unavailable(device: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        BusError::DeviceUnavailable {
            device: device.into(),
            reason: reason.to_string(),
        }
    }

    /// The register involved, if the error is tied to one.
    pub fn register(&self) -> Option<u8> {
        match self {
            BusError::Transfer { register, .. } => Some(*register),
            _ => None,
        }
    }
}

//! Top-level error type, severity and category.

use core::fmt;

use crate::{BusError, ConfigError, DriverError, ReceiverError};

/// Top-level error that wraps every layer's error.
#[derive(Debug, thiserror::Error)]
pub enum RcDriveError {
    /// I2C bus errors
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// PWM driver errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Receiver capture errors
    #[error("Receiver error: {0}")]
    Receiver(#[from] ReceiverError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging setup errors
    #[error("Logging error: {0}")]
    Logging(String),
}

impl RcDriveError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RcDriveError::Bus(_) => ErrorCategory::Bus,
            RcDriveError::Driver(_) => ErrorCategory::Driver,
            RcDriveError::Receiver(_) => ErrorCategory::Receiver,
            RcDriveError::Config(_) => ErrorCategory::Config,
            RcDriveError::Logging(_) => ErrorCategory::Logging,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RcDriveError::Bus(e) => e.severity(),
            RcDriveError::Driver(e) => e.severity(),
            RcDriveError::Receiver(e) => e.severity(),
            RcDriveError::Config(_) => ErrorSeverity::Error,
            RcDriveError::Logging(_) => ErrorSeverity::Warning,
        }
    }

    /// Check if the process can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a logging error with a message.
    pub fn logging(msg: impl Into<String>) -> Self {
        RcDriveError::Logging(msg.into())
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// I2C bus
    Bus = 0,
    /// PWM output driver
    Driver = 1,
    /// Receiver capture
    Receiver = 2,
    /// Configuration
    Config = 3,
    /// Logging
    Logging = 4,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Bus => write!(f, "Bus"),
            ErrorCategory::Driver => write!(f, "Driver"),
            ErrorCategory::Receiver => write!(f, "Receiver"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Logging => write!(f, "Logging"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the process should stop driving actuators
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

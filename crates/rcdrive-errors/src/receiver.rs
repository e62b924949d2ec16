//! Receiver edge capture errors.

use crate::common::ErrorSeverity;

/// Errors raised while setting up or running pulse capture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiverError {
    /// No reader has been started.
    #[error("pulse reader not initialized")]
    NotInitialized,

    /// Another reader already owns the GPIO chip.
    #[error("a pulse reader is already active on {chip}")]
    AlreadyActive {
        /// Chip path or name
        chip: String,
    },

    /// The GPIO chip could not be opened.
    #[error("GPIO device {device} unavailable: {reason}")]
    DeviceUnavailable {
        /// Chip path or name
        device: String,
        /// Underlying failure
        reason: String,
    },

    /// The kernel refused the edge-detection line request.
    #[error("GPIO line request failed: {reason}")]
    LineRequest {
        /// Underlying failure
        reason: String,
    },

    /// The background capture thread could not be started.
    #[error("failed to spawn capture thread: {0}")]
    ThreadSpawn(String),

    /// The line table lock was poisoned.
    #[error("receiver lock failed during {context}")]
    Lock {
        /// Operation that attempted to take the lock
        context: &'static str,
    },

    /// Reader configuration rejected before touching hardware.
    #[error("invalid receiver configuration: {0}")]
    InvalidConfig(String),

    /// Reading edge events failed.
    #[error("edge event source error: {0}")]
    EventSource(String),
}

impl ReceiverError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReceiverError::Lock { .. } => ErrorSeverity::Critical,
            ReceiverError::EventSource(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create a device unavailable error.
    pub fn unavailable(device: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ReceiverError::DeviceUnavailable {
            device: device.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        ReceiverError::InvalidConfig(msg.into())
    }

    /// Check if the hardware resource could not be obtained.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            ReceiverError::DeviceUnavailable { .. }
                | ReceiverError::LineRequest { .. }
                | ReceiverError::AlreadyActive { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_severity() {
        assert_eq!(
            ReceiverError::Lock { context: "read" }.severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            ReceiverError::EventSource("EINTR".into()).severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_device_unavailable_kinds() {
        assert!(ReceiverError::unavailable("/dev/gpiochip4", "ENOENT").is_device_unavailable());
        assert!(
            ReceiverError::AlreadyActive {
                chip: "gpiochip4".into()
            }
            .is_device_unavailable()
        );
        assert!(!ReceiverError::invalid_config("no lines").is_device_unavailable());
    }
}

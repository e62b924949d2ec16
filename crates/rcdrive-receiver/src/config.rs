//! Receiver configuration

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ReceiverError;

/// Default GPIO chip on the Raspberry Pi 5 header.
pub const DEFAULT_CHIP: &str = "/dev/gpiochip4";
/// Throttle channel input.
pub const DEFAULT_MOTOR_GPIO: u32 = 24;
/// Steering channel input.
pub const DEFAULT_SERVO_GPIO: u32 = 23;
/// Pulse the bundled receiver emits when it loses the transmitter.
pub const DEFAULT_FAILSAFE_US: u32 = 1530;
/// Maximum silence before a line counts as stale.
pub const DEFAULT_WATCHDOG_US: u64 = 200_000;
/// Line offsets must be below this.
pub const MAX_LINE_OFFSET: u32 = 64;

/// Which capture mechanism to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// One batched line request, edge events drained by one thread
    #[default]
    EdgeEvents,
    /// One request per pin with an edge and watchdog callback each
    Alerts,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::EdgeEvents => write!(f, "edge-events"),
            BackendKind::Alerts => write!(f, "alerts"),
        }
    }
}

/// One monitored receiver line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Line offset on the chip
    pub gpio: u32,
    /// Failsafe reference pulse; `None` disables failsafe matching
    #[serde(default = "default_failsafe")]
    pub failsafe_us: Option<u32>,
    /// Staleness timeout; `None` disables the check
    #[serde(default = "default_watchdog")]
    pub watchdog_us: Option<u64>,
}

fn default_failsafe() -> Option<u32> {
    Some(DEFAULT_FAILSAFE_US)
}

fn default_watchdog() -> Option<u64> {
    Some(DEFAULT_WATCHDOG_US)
}

impl LineConfig {
    /// Line with the default failsafe reference and watchdog.
    pub fn new(gpio: u32) -> Self {
        Self {
            gpio,
            failsafe_us: default_failsafe(),
            watchdog_us: default_watchdog(),
        }
    }

    /// Set or disable the failsafe reference.
    pub fn with_failsafe(mut self, failsafe_us: Option<u32>) -> Self {
        self.failsafe_us = failsafe_us;
        self
    }

    /// Set or disable the watchdog.
    pub fn with_watchdog(mut self, watchdog_us: Option<u64>) -> Self {
        self.watchdog_us = watchdog_us;
        self
    }
}

/// When a run of pulses counts as the receiver's failsafe output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailsafePolicy {
    /// A pulse matches when strictly closer than this to the reference
    pub tolerance_us: u32,
    /// Consecutive matches that declare the signal lost
    pub threshold: u32,
}

impl Default for FailsafePolicy {
    fn default() -> Self {
        Self {
            tolerance_us: 10,
            threshold: 20,
        }
    }
}

impl FailsafePolicy {
    /// Whether `pulse_us` matches `reference_us`.
    pub fn matches(&self, pulse_us: u32, reference_us: u32) -> bool {
        pulse_us.abs_diff(reference_us) < self.tolerance_us
    }
}

/// Everything a reader needs before touching hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Capture backend
    pub backend: BackendKind,
    /// GPIO chip path or name
    pub chip: String,
    /// Consumer label shown by `gpioinfo`
    pub consumer: String,
    /// Monitored lines
    pub lines: Vec<LineConfig>,
    /// Failsafe matching
    pub failsafe: FailsafePolicy,
    /// Edge events drained per wake
    pub event_buffer: usize,
    /// Longest single wait for edges; bounds teardown latency.
    pub event_timeout_ms: u64,
    /// Measured pulses within this many microseconds of the stored value
    /// do not replace it. Zero disables the deadband.
    pub hold_deadband_us: u32,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            chip: DEFAULT_CHIP.to_string(),
            consumer: "rcdrive".to_string(),
            lines: vec![
                LineConfig::new(DEFAULT_MOTOR_GPIO),
                LineConfig::new(DEFAULT_SERVO_GPIO),
            ],
            failsafe: FailsafePolicy::default(),
            event_buffer: 16,
            event_timeout_ms: 100,
            hold_deadband_us: 0,
        }
    }
}

impl ReceiverConfig {
    /// Configuration for `lines` on `chip`, other settings default.
    pub fn new(chip: impl Into<String>, lines: Vec<LineConfig>) -> Self {
        Self {
            chip: chip.into(),
            lines,
            ..Self::default()
        }
    }

    /// Select the backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the failsafe policy.
    pub fn with_failsafe(mut self, failsafe: FailsafePolicy) -> Self {
        self.failsafe = failsafe;
        self
    }

    /// Set the hold deadband.
    pub fn with_hold_deadband(mut self, deadband_us: u32) -> Self {
        self.hold_deadband_us = deadband_us;
        self
    }

    /// Set the event wait timeout.
    pub fn with_event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Event wait timeout as a duration.
    pub fn event_timeout(&self) -> Duration {
        Duration::from_millis(self.event_timeout_ms)
    }

    /// GPIO offsets in configuration order.
    pub fn gpios(&self) -> Vec<u32> {
        self.lines.iter().map(|line| line.gpio).collect()
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::InvalidConfig`] for an empty chip or line list,
    /// duplicate or out-of-range offsets, a zero buffer or timeout, or a
    /// zero failsafe threshold.
    pub fn validate(&self) -> Result<(), ReceiverError> {
        if self.chip.trim().is_empty() {
            return Err(ReceiverError::invalid_config("chip must not be empty"));
        }
        if self.lines.is_empty() {
            return Err(ReceiverError::invalid_config("at least one line is required"));
        }

        let mut seen = BTreeSet::new();
        for line in &self.lines {
            if line.gpio >= MAX_LINE_OFFSET {
                return Err(ReceiverError::invalid_config(format!(
                    "line offset {} must be below {MAX_LINE_OFFSET}",
                    line.gpio
                )));
            }
            if !seen.insert(line.gpio) {
                return Err(ReceiverError::invalid_config(format!(
                    "line offset {} listed twice",
                    line.gpio
                )));
            }
        }

        if self.event_buffer == 0 {
            return Err(ReceiverError::invalid_config("event_buffer must be positive"));
        }
        if self.event_timeout_ms == 0 {
            return Err(ReceiverError::invalid_config(
                "event_timeout_ms must be positive",
            ));
        }
        if self.failsafe.threshold == 0 {
            return Err(ReceiverError::invalid_config(
                "failsafe threshold must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReceiverConfig::default();
        assert_eq!(config.chip, "/dev/gpiochip4");
        assert_eq!(config.gpios(), vec![24, 23]);
        assert_eq!(config.failsafe.tolerance_us, 10);
        assert_eq!(config.failsafe.threshold, 20);
        assert_eq!(config.event_buffer, 16);
        assert!(config.validate().ok().is_some());
    }

    #[test]
    fn test_failsafe_tolerance_is_strict() {
        let policy = FailsafePolicy::default();
        assert!(policy.matches(1530, 1530));
        assert!(policy.matches(1539, 1530));
        assert!(policy.matches(1521, 1530));
        assert!(!policy.matches(1540, 1530));
        assert!(!policy.matches(1520, 1530));
    }

    #[test]
    fn test_duplicate_lines_rejected() {
        let config = ReceiverConfig::new("chip", vec![LineConfig::new(23), LineConfig::new(23)]);
        assert!(matches!(
            config.validate(),
            Err(ReceiverError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_offset_range() {
        let config = ReceiverConfig::new("chip", vec![LineConfig::new(64)]);
        assert!(config.validate().err().is_some());
        let config = ReceiverConfig::new("chip", vec![LineConfig::new(63)]);
        assert!(config.validate().ok().is_some());
    }

    #[test]
    fn test_empty_lines_rejected() {
        assert!(ReceiverConfig::new("chip", Vec::new()).validate().err().is_some());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = ReceiverConfig::default().with_failsafe(FailsafePolicy {
            tolerance_us: 10,
            threshold: 0,
        });
        assert!(config.validate().err().is_some());
    }
}

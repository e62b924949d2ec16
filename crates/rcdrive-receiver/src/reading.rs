//! Pulse readings and loss reasons

use std::fmt;

/// Raw sentinel for a lost channel.
pub const LOST_PULSE: i32 = -1;

/// Why a line has no usable pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// The GPIO is not monitored by this reader.
    Unmapped,
    /// No complete pulse has been measured yet.
    NoPulseYet,
    /// No rising edge within the line's watchdog timeout.
    Stale,
    /// The receiver keeps sending its failsafe pulse.
    Failsafe,
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossReason::Unmapped => write!(f, "unmapped"),
            LossReason::NoPulseYet => write!(f, "no pulse yet"),
            LossReason::Stale => write!(f, "stale"),
            LossReason::Failsafe => write!(f, "failsafe"),
        }
    }
}

/// Result of polling one line.
///
/// Signal loss is an ordinary value: callers should hold their last safe
/// command rather than treat it as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PulseReading {
    /// Last measured pulse width in microseconds.
    Valid(u32),
    /// No usable signal.
    Lost(LossReason),
}

impl PulseReading {
    /// Pulse width, if the signal is present.
    pub fn pulse_us(self) -> Option<u32> {
        match self {
            PulseReading::Valid(us) => Some(us),
            PulseReading::Lost(_) => None,
        }
    }

    /// Whether the signal is lost.
    pub fn is_lost(self) -> bool {
        matches!(self, PulseReading::Lost(_))
    }

    /// Pulse width with [`LOST_PULSE`] standing in for any loss.
    pub fn as_raw(self) -> i32 {
        match self {
            PulseReading::Valid(us) => i32::try_from(us).unwrap_or(i32::MAX),
            PulseReading::Lost(_) => LOST_PULSE,
        }
    }
}

impl fmt::Display for PulseReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseReading::Valid(us) => write!(f, "{us} us"),
            PulseReading::Lost(reason) => write!(f, "lost ({reason})"),
        }
    }
}

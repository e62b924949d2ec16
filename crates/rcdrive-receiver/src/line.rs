//! Per-line pulse state machine
//!
//! A line is idle until a rising edge arrives, then awaits the falling edge
//! that completes the pulse. Widths come from edge timestamps; staleness is
//! judged against when the reader *saw* the last rising edge.

use std::fmt;
use std::sync::Arc;

use crate::config::{FailsafePolicy, LineConfig};
use crate::reading::{LossReason, PulseReading};

/// Invoked with `(gpio, pulse_us)` after each completed pulse, outside the
/// reader's lock.
pub type PulseCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// A pulse measured on a falling edge, with the callback to run for it.
#[derive(Clone)]
pub struct CompletedPulse {
    /// Line the pulse was measured on
    pub gpio: u32,
    /// Width in microseconds
    pub pulse_us: u32,
    pub(crate) callback: Option<PulseCallback>,
}

impl CompletedPulse {
    /// Run the line's callback, if any.
    pub fn notify(&self) {
        if let Some(callback) = &self.callback {
            callback(self.gpio, self.pulse_us);
        }
    }
}

impl fmt::Debug for CompletedPulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletedPulse")
            .field("gpio", &self.gpio)
            .field("pulse_us", &self.pulse_us)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// State of one monitored line.
pub struct PulseLine {
    gpio: u32,
    failsafe_us: Option<u32>,
    watchdog_us: Option<u64>,
    rise_us: Option<u64>,
    last_rise_seen_us: Option<u64>,
    pulse_us: Option<u32>,
    failsafe_count: u32,
    timed_out: bool,
    callback: Option<PulseCallback>,
}

impl fmt::Debug for PulseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseLine")
            .field("gpio", &self.gpio)
            .field("failsafe_us", &self.failsafe_us)
            .field("watchdog_us", &self.watchdog_us)
            .field("rise_us", &self.rise_us)
            .field("last_rise_seen_us", &self.last_rise_seen_us)
            .field("pulse_us", &self.pulse_us)
            .field("failsafe_count", &self.failsafe_count)
            .field("timed_out", &self.timed_out)
            .finish_non_exhaustive()
    }
}

impl PulseLine {
    /// Idle line with no measurement.
    pub fn new(config: &LineConfig, callback: Option<PulseCallback>) -> Self {
        Self {
            gpio: config.gpio,
            failsafe_us: config.failsafe_us,
            watchdog_us: config.watchdog_us,
            rise_us: None,
            last_rise_seen_us: None,
            pulse_us: None,
            failsafe_count: 0,
            timed_out: false,
            callback,
        }
    }

    /// Record a rising edge stamped `timestamp_us`, seen at `now_us`.
    pub fn on_rising(&mut self, timestamp_us: u64, now_us: u64) {
        self.rise_us = Some(timestamp_us);
        self.last_rise_seen_us = Some(now_us);
    }

    /// Complete a pulse on a falling edge stamped `timestamp_us`.
    ///
    /// Returns `None`, leaving the line idle, when no rising edge is pending
    /// or the timestamps run backwards. The failsafe counter always sees the
    /// measured width; the stored width only changes when it moves by more
    /// than `deadband_us`.
    pub fn on_falling(
        &mut self,
        timestamp_us: u64,
        policy: &FailsafePolicy,
        deadband_us: u32,
    ) -> Option<CompletedPulse> {
        let rise_us = self.rise_us.take()?;
        let width = timestamp_us.checked_sub(rise_us)?;
        let width = u32::try_from(width).unwrap_or(u32::MAX);

        match self.failsafe_us {
            Some(reference) if policy.matches(width, reference) => {
                self.failsafe_count = self.failsafe_count.saturating_add(1);
            }
            _ => self.failsafe_count = 0,
        }

        let replace = match self.pulse_us {
            Some(stored) => deadband_us == 0 || stored.abs_diff(width) > deadband_us,
            None => true,
        };
        if replace {
            self.pulse_us = Some(width);
        }
        self.timed_out = false;

        Some(CompletedPulse {
            gpio: self.gpio,
            pulse_us: width,
            callback: self.callback.clone(),
        })
    }

    /// Drop the stored width after a watchdog expiry. Lines with the
    /// watchdog disabled ignore expiries; returns whether the width was
    /// dropped.
    pub fn expire(&mut self) -> bool {
        if self.watchdog_us.is_none() {
            return false;
        }
        self.pulse_us = None;
        self.rise_us = None;
        self.timed_out = true;
        true
    }

    /// Current reading at `now_us`.
    pub fn reading(&self, now_us: u64, policy: &FailsafePolicy) -> PulseReading {
        if let Some(watchdog_us) = self.watchdog_us {
            match self.last_rise_seen_us {
                None => return PulseReading::Lost(LossReason::NoPulseYet),
                Some(seen) if now_us.saturating_sub(seen) > watchdog_us => {
                    return PulseReading::Lost(LossReason::Stale);
                }
                Some(_) => {}
            }
        }

        if self.failsafe_count >= policy.threshold {
            return PulseReading::Lost(LossReason::Failsafe);
        }

        match self.pulse_us {
            Some(us) => PulseReading::Valid(us),
            None if self.timed_out => PulseReading::Lost(LossReason::Stale),
            None => PulseReading::Lost(LossReason::NoPulseYet),
        }
    }

    /// Line offset.
    pub fn gpio(&self) -> u32 {
        self.gpio
    }

    /// Consecutive failsafe matches so far.
    pub fn failsafe_count(&self) -> u32 {
        self.failsafe_count
    }

    /// Whether a rising edge is waiting for its falling edge.
    pub fn awaiting_fall(&self) -> bool {
        self.rise_us.is_some()
    }
}

//! The `PulseCapture` capability shared by both backends

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, trace};

use crate::clock::{MonotonicClock, SystemClock};
use crate::config::{BackendKind, ReceiverConfig};
use crate::event::EdgeEvent;
use crate::line::PulseCallback;
use crate::reading::PulseReading;
use crate::stats::{CaptureStats, StatsCounters};
use crate::table::{EdgeOutcome, LineTable};
use crate::ReceiverError;

/// A running pulse reader.
///
/// Backends differ only in how edges reach the line table; readings,
/// failsafe and staleness rules are identical.
pub trait PulseCapture: Send + Sync + fmt::Debug {
    /// Current reading for `gpio`.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::Lock`] if the line table lock is poisoned.
    fn read_pulse(&self, gpio: u32) -> Result<PulseReading, ReceiverError>;

    /// Counter snapshot.
    fn stats(&self) -> CaptureStats;

    /// Which backend this is.
    fn backend(&self) -> BackendKind;

    /// Whether capture is still running.
    fn is_running(&self) -> bool;

    /// Stop capture, wait for it to finish and release the hardware.
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Reports a capture thread that ended abnormally. The hardware is
    /// released regardless.
    fn shutdown(&mut self) -> Result<(), ReceiverError>;
}

/// Opens a [`PulseCapture`] for a configuration.
pub trait CaptureFactory: Send + Sync + fmt::Debug {
    /// Claim the chip, request the lines and start capture.
    ///
    /// # Errors
    ///
    /// Any construction failure; partially acquired resources are released
    /// before returning.
    fn open(
        &self,
        config: &ReceiverConfig,
        options: CaptureOptions,
    ) -> Result<Box<dyn PulseCapture>, ReceiverError>;
}

/// Runtime hooks that do not belong in serialized configuration.
#[derive(Clone)]
pub struct CaptureOptions {
    pub(crate) callbacks: BTreeMap<u32, PulseCallback>,
    pub(crate) clock: Arc<dyn MonotonicClock>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            callbacks: BTreeMap::new(),
            clock: Arc::new(SystemClock::new()),
        }
    }
}

impl fmt::Debug for CaptureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureOptions")
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("clock", &self.clock)
            .finish()
    }
}

impl CaptureOptions {
    /// System clock, no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback(gpio, pulse_us)` after each pulse completed on `gpio`.
    pub fn on_pulse<F>(mut self, gpio: u32, callback: F) -> Self
    where
        F: Fn(u32, u32) + Send + Sync + 'static,
    {
        self.callbacks.insert(gpio, Arc::new(callback));
        self
    }

    /// Judge staleness against `clock`.
    pub fn with_clock(mut self, clock: impl MonotonicClock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

/// Line table, counters and clock shared between a reader and its capture
/// thread or callbacks.
#[derive(Debug)]
pub(crate) struct CaptureShared {
    table: Mutex<LineTable>,
    stats: StatsCounters,
    clock: Arc<dyn MonotonicClock>,
}

impl CaptureShared {
    pub(crate) fn new(table: LineTable, clock: Arc<dyn MonotonicClock>) -> Self {
        Self {
            table: Mutex::new(table),
            stats: StatsCounters::default(),
            clock,
        }
    }

    fn lock(&self, context: &'static str) -> Result<MutexGuard<'_, LineTable>, ReceiverError> {
        self.table.lock().map_err(|poisoned| {
            error!("receiver lock failed during {context}: {poisoned}");
            ReceiverError::Lock { context }
        })
    }

    /// Apply one edge, then run the completed pulse's callback unlocked.
    pub(crate) fn handle_edge(&self, event: &EdgeEvent) -> Result<(), ReceiverError> {
        self.stats.event();
        let now_us = self.clock.now_us();
        let outcome = self.lock("edge")?.apply(event, now_us);

        match outcome {
            EdgeOutcome::Pulse(pulse) => {
                self.stats.pulse();
                trace!(gpio = pulse.gpio, pulse_us = pulse.pulse_us, "pulse measured");
                pulse.notify();
            }
            EdgeOutcome::Unmapped => self.stats.unmapped(),
            EdgeOutcome::Rising | EdgeOutcome::Ignored => {}
        }
        Ok(())
    }

    pub(crate) fn expire(&self, gpio: u32) -> Result<(), ReceiverError> {
        if self.lock("watchdog")?.expire(gpio) {
            self.stats.watchdog_expiry();
        }
        Ok(())
    }

    pub(crate) fn read(&self, gpio: u32) -> Result<PulseReading, ReceiverError> {
        let now_us = self.clock.now_us();
        Ok(self.lock("read")?.read(gpio, now_us))
    }

    pub(crate) fn source_error(&self) {
        self.stats.source_error();
    }

    pub(crate) fn stats(&self) -> CaptureStats {
        self.stats.snapshot()
    }
}

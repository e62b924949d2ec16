//! Per-pin alert reader
//!
//! Each pin is registered with its own edge and watchdog handler. Handlers
//! run on the alert source's threads and update the shared line table.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::capture::{CaptureOptions, CaptureShared, PulseCapture};
use crate::config::{BackendKind, ReceiverConfig};
use crate::guard::ReceiverClaim;
use crate::reading::PulseReading;
use crate::source::{Alert, AlertSource};
use crate::stats::CaptureStats;
use crate::table::LineTable;
use crate::ReceiverError;

/// Reader fed by an [`AlertSource`].
pub struct AlertReader {
    shared: Arc<CaptureShared>,
    running: Arc<AtomicBool>,
    source: Mutex<Option<Box<dyn AlertSource>>>,
    claim: Option<ReceiverClaim>,
}

impl std::fmt::Debug for AlertReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertReader")
            .field("shared", &self.shared)
            .field("running", &self.running)
            .field("claim", &self.claim)
            .finish_non_exhaustive()
    }
}

impl AlertReader {
    /// Claim `config.chip` and register every line with `source`.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::InvalidConfig`], [`ReceiverError::AlreadyActive`], or
    /// whatever `source` reports for a pin. On failure every pin registered
    /// so far is released along with the claim.
    pub fn start(
        config: &ReceiverConfig,
        options: CaptureOptions,
        source: impl AlertSource + 'static,
    ) -> Result<Self, ReceiverError> {
        let claim = ReceiverClaim::acquire(&config.chip)?;
        Self::start_claimed(claim, config, options, source)
    }

    /// Register every line under an existing claim.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn start_claimed(
        claim: ReceiverClaim,
        config: &ReceiverConfig,
        options: CaptureOptions,
        source: impl AlertSource + 'static,
    ) -> Result<Self, ReceiverError> {
        let table = LineTable::new(config, &options.callbacks)?;
        let shared = Arc::new(CaptureShared::new(table, options.clock));
        let running = Arc::new(AtomicBool::new(true));
        let mut source: Box<dyn AlertSource> = Box::new(source);

        for line in &config.lines {
            let gpio = line.gpio;
            let handler_shared = Arc::clone(&shared);
            let handler_running = Arc::clone(&running);
            let registered = source.watch(
                gpio,
                line.watchdog_us.map(Duration::from_micros),
                Box::new(move |alert| handle_alert(&handler_shared, &handler_running, gpio, alert)),
            );

            if let Err(e) = registered {
                error!("failed to watch GPIO {gpio}: {e}");
                if let Err(release_err) = source.release_all() {
                    warn!("releasing partially registered pins failed: {release_err}");
                }
                return Err(e);
            }
        }

        info!(
            chip = claim.chip(),
            lines = ?config.gpios(),
            "alert reader started"
        );
        Ok(Self {
            shared,
            running,
            source: Mutex::new(Some(source)),
            claim: Some(claim),
        })
    }
}

fn handle_alert(shared: &CaptureShared, running: &AtomicBool, gpio: u32, alert: Alert) {
    if !running.load(Ordering::Acquire) {
        return;
    }

    let result = match alert {
        Alert::Edge(event) => shared.handle_edge(&event),
        Alert::WatchdogExpired => {
            warn!("PWM timeout on GPIO {gpio}");
            shared.expire(gpio)
        }
    };
    if let Err(e) = result {
        error!("alert handling stopped: {e}");
        running.store(false, Ordering::Release);
    }
}

impl PulseCapture for AlertReader {
    fn read_pulse(&self, gpio: u32) -> Result<PulseReading, ReceiverError> {
        self.shared.read(gpio)
    }

    fn stats(&self) -> CaptureStats {
        self.shared.stats()
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Alerts
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn shutdown(&mut self) -> Result<(), ReceiverError> {
        let Some(mut source) = self.source.get_mut().take() else {
            return Ok(());
        };

        info!("stopping alert reader");
        self.running.store(false, Ordering::Release);
        let released = source.release_all();
        drop(source);
        self.claim = None;

        if let Err(e) = &released {
            error!("alert watchers did not stop cleanly: {e}");
        } else {
            info!("alert reader stopped");
        }
        released
    }
}

impl Drop for AlertReader {
    fn drop(&mut self) {
        if self.source.get_mut().is_some() {
            warn!("alert reader dropped while running - stopping");
            if let Err(e) = self.shutdown() {
                error!("alert reader shutdown failed: {e}");
            }
        }
    }
}

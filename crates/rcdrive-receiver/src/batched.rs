//! Batched edge-event reader
//!
//! One line request covers every monitored line; a single capture thread
//! drains up to `event_buffer` events per wake.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::capture::{CaptureOptions, CaptureShared, PulseCapture};
use crate::config::{BackendKind, ReceiverConfig};
use crate::guard::ReceiverClaim;
use crate::reading::PulseReading;
use crate::source::EdgeSource;
use crate::stats::CaptureStats;
use crate::table::LineTable;
use crate::ReceiverError;

const ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Reader fed by an [`EdgeSource`] on a background thread.
#[derive(Debug)]
pub struct EdgeEventReader {
    shared: Arc<CaptureShared>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    claim: Option<ReceiverClaim>,
}

impl EdgeEventReader {
    /// Claim `config.chip` and start capturing from `source`.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::InvalidConfig`], [`ReceiverError::AlreadyActive`] or
    /// [`ReceiverError::ThreadSpawn`]. On failure the claim is released and
    /// the source dropped.
    pub fn start<S: EdgeSource>(
        config: &ReceiverConfig,
        options: CaptureOptions,
        source: S,
    ) -> Result<Self, ReceiverError> {
        let claim = ReceiverClaim::acquire(&config.chip)?;
        Self::start_claimed(claim, config, options, source)
    }

    /// Start capturing under an existing claim.
    ///
    /// # Errors
    ///
    /// As for [`start`](Self::start).
    pub fn start_claimed<S: EdgeSource>(
        claim: ReceiverClaim,
        config: &ReceiverConfig,
        options: CaptureOptions,
        source: S,
    ) -> Result<Self, ReceiverError> {
        let table = LineTable::new(config, &options.callbacks)?;
        let shared = Arc::new(CaptureShared::new(table, options.clock));
        let running = Arc::new(AtomicBool::new(true));

        let context = CaptureContext {
            shared: Arc::clone(&shared),
            running: Arc::clone(&running),
            timeout: config.event_timeout(),
            max_events: config.event_buffer,
        };
        let thread = thread::Builder::new()
            .name("rcdrive-capture".to_string())
            .spawn(move || capture_thread_main(context, source))
            .map_err(|e| {
                error!("failed to spawn capture thread: {e}");
                ReceiverError::ThreadSpawn(e.to_string())
            })?;

        info!(
            chip = claim.chip(),
            lines = ?config.gpios(),
            "edge-event reader started"
        );
        Ok(Self {
            shared,
            running,
            thread: Some(thread),
            claim: Some(claim),
        })
    }
}

struct CaptureContext {
    shared: Arc<CaptureShared>,
    running: Arc<AtomicBool>,
    timeout: Duration,
    max_events: usize,
}

fn capture_thread_main<S: EdgeSource>(ctx: CaptureContext, mut source: S) {
    let mut events = Vec::with_capacity(ctx.max_events);

    while ctx.running.load(Ordering::Acquire) {
        events.clear();
        match source.wait_events(ctx.timeout, &mut events, ctx.max_events) {
            Ok(_) => {}
            Err(e) => {
                ctx.shared.source_error();
                warn!("edge event read failed: {e}");
                thread::sleep(ERROR_BACKOFF);
                continue;
            }
        }

        for event in &events {
            if let Err(e) = ctx.shared.handle_edge(event) {
                error!("capture thread stopping: {e}");
                ctx.running.store(false, Ordering::Release);
                return;
            }
        }
    }
    debug!("capture thread exiting");
}

impl PulseCapture for EdgeEventReader {
    fn read_pulse(&self, gpio: u32) -> Result<PulseReading, ReceiverError> {
        self.shared.read(gpio)
    }

    fn stats(&self) -> CaptureStats {
        self.shared.stats()
    }

    fn backend(&self) -> BackendKind {
        BackendKind::EdgeEvents
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn shutdown(&mut self) -> Result<(), ReceiverError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        info!("stopping edge-event reader");
        self.running.store(false, Ordering::Release);
        let joined = thread.join();
        // Released only once the thread, and with it the line request, is gone
        self.claim = None;

        match joined {
            Ok(()) => {
                info!("edge-event reader stopped");
                Ok(())
            }
            Err(_) => {
                error!("capture thread panicked");
                Err(ReceiverError::EventSource(
                    "capture thread panicked".to_string(),
                ))
            }
        }
    }
}

impl Drop for EdgeEventReader {
    fn drop(&mut self) {
        if self.thread.is_some() {
            warn!("edge-event reader dropped while running - stopping");
            if let Err(e) = self.shutdown() {
                error!("edge-event reader shutdown failed: {e}");
            }
        }
    }
}

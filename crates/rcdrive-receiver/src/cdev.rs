//! Linux GPIO character device backends
//!
//! Requires the `cdev` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gpiocdev::Request;
use gpiocdev::line::{Bias, EdgeDetection, EdgeKind as CdevEdgeKind, EventClock};
use tracing::{debug, error, info, warn};

use crate::alerts::AlertReader;
use crate::batched::EdgeEventReader;
use crate::capture::{CaptureFactory, CaptureOptions, PulseCapture};
use crate::config::{BackendKind, ReceiverConfig};
use crate::event::{EdgeEvent, EdgeKind};
use crate::guard::ReceiverClaim;
use crate::source::{Alert, AlertHandler, AlertSource, EdgeSource};
use crate::ReceiverError;

const WATCHER_BACKOFF: Duration = Duration::from_millis(10);

fn convert(event: &gpiocdev::line::EdgeEvent) -> EdgeEvent {
    let kind = match event.kind {
        CdevEdgeKind::Rising => EdgeKind::Rising,
        CdevEdgeKind::Falling => EdgeKind::Falling,
    };
    EdgeEvent {
        offset: event.offset,
        kind,
        timestamp_ns: event.timestamp_ns,
    }
}

fn event_error(e: gpiocdev::Error) -> ReceiverError {
    ReceiverError::EventSource(e.to_string())
}

fn request_lines(config: &ReceiverConfig, offsets: &[u32]) -> Result<Request, ReceiverError> {
    Request::builder()
        .on_chip(&config.chip)
        .with_consumer(config.consumer.as_str())
        .with_lines(offsets)
        .as_input()
        .with_bias(Bias::PullDown)
        .with_edge_detection(EdgeDetection::BothEdges)
        .with_event_clock(EventClock::Monotonic)
        .request()
        .map_err(|e| ReceiverError::LineRequest {
            reason: e.to_string(),
        })
}

// u64 words per kernel edge event
fn event_words(request: &Request) -> usize {
    request.edge_event_u64_size().max(1)
}

fn check_chip(config: &ReceiverConfig) -> Result<(), ReceiverError> {
    gpiocdev::Chip::from_path(&config.chip)
        .map(drop)
        .map_err(|e| ReceiverError::unavailable(config.chip.clone(), e))
}

/// All monitored lines in one edge-detection request.
pub struct CdevEdgeSource {
    request: Request,
    offsets: Vec<u32>,
    buf: Vec<u64>,
}

impl std::fmt::Debug for CdevEdgeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdevEdgeSource")
            .field("offsets", &self.offsets)
            .finish_non_exhaustive()
    }
}

impl CdevEdgeSource {
    /// Request every line of `config` as pulled-down inputs with both-edge
    /// detection on the monotonic clock.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::DeviceUnavailable`] if the chip cannot be opened,
    /// [`ReceiverError::LineRequest`] if the lines cannot be requested.
    pub fn open(config: &ReceiverConfig) -> Result<Self, ReceiverError> {
        check_chip(config)?;
        let offsets = config.gpios();
        let request = request_lines(config, &offsets)?;
        let buf = vec![0; event_words(&request).saturating_mul(config.event_buffer)];
        debug!(chip = %config.chip, lines = ?offsets, "edge lines requested");
        Ok(Self {
            request,
            offsets,
            buf,
        })
    }
}

impl EdgeSource for CdevEdgeSource {
    fn wait_events(
        &mut self,
        timeout: Duration,
        events: &mut Vec<EdgeEvent>,
        max: usize,
    ) -> Result<usize, ReceiverError> {
        if !self.request.wait_edge_event(timeout).map_err(event_error)? {
            return Ok(0);
        }

        let words = event_words(&self.request);
        self.buf.resize(words.saturating_mul(max.max(1)), 0);
        let read = self
            .request
            .read_edge_events_into_slice(&mut self.buf)
            .map_err(event_error)?;

        let before = events.len();
        for chunk in self.buf.get(..read).unwrap_or_default().chunks_exact(words) {
            let event = self.request.edge_event_from_slice(chunk).map_err(event_error)?;
            events.push(convert(&event));
        }
        Ok(events.len().saturating_sub(before))
    }
}

/// One request and watcher thread per pin.
#[derive(Debug)]
pub struct CdevAlertSource {
    config: ReceiverConfig,
    running: Arc<AtomicBool>,
    watchers: Vec<(u32, JoinHandle<()>)>,
}

impl CdevAlertSource {
    /// Alert source for the chip and consumer of `config`.
    pub fn new(config: &ReceiverConfig) -> Self {
        Self {
            config: config.clone(),
            running: Arc::new(AtomicBool::new(true)),
            watchers: Vec::new(),
        }
    }
}

impl AlertSource for CdevAlertSource {
    fn watch(
        &mut self,
        gpio: u32,
        watchdog: Option<Duration>,
        handler: AlertHandler,
    ) -> Result<(), ReceiverError> {
        if self.watchers.is_empty() {
            check_chip(&self.config)?;
        }
        let request = request_lines(&self.config, &[gpio])?;
        let running = Arc::clone(&self.running);
        let poll = self.config.event_timeout();

        let handle = thread::Builder::new()
            .name(format!("rcdrive-alert-{gpio}"))
            .spawn(move || watcher_main(&request, &running, watchdog, poll, &handler))
            .map_err(|e| ReceiverError::ThreadSpawn(e.to_string()))?;
        self.watchers.push((gpio, handle));
        debug!("watching GPIO {gpio} with {watchdog:?} watchdog");
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), ReceiverError> {
        self.running.store(false, Ordering::Release);

        let mut panicked = Vec::new();
        for (gpio, handle) in self.watchers.drain(..) {
            if handle.join().is_err() {
                error!("alert watcher for GPIO {gpio} panicked");
                panicked.push(gpio);
            }
        }
        self.running = Arc::new(AtomicBool::new(true));

        if panicked.is_empty() {
            Ok(())
        } else {
            Err(ReceiverError::EventSource(format!(
                "alert watchers panicked on GPIO {panicked:?}"
            )))
        }
    }
}

// Waits in `poll` slices so teardown stays bounded; expiry repeats every
// `watchdog` of silence.
fn watcher_main(
    request: &Request,
    running: &AtomicBool,
    watchdog: Option<Duration>,
    poll: Duration,
    handler: &AlertHandler,
) {
    let mut last_activity = Instant::now();
    while running.load(Ordering::Acquire) {
        match request.wait_edge_event(poll) {
            Ok(true) => match request.read_edge_event() {
                Ok(event) => {
                    last_activity = Instant::now();
                    handler(Alert::Edge(convert(&event)));
                }
                Err(e) => warn!("alert edge read failed: {e}"),
            },
            Ok(false) => {
                if let Some(watchdog) = watchdog
                    && last_activity.elapsed() >= watchdog
                {
                    last_activity = Instant::now();
                    handler(Alert::WatchdogExpired);
                }
            }
            Err(e) => {
                warn!("alert wait failed: {e}");
                thread::sleep(WATCHER_BACKOFF);
            }
        }
    }
}

/// Opens either backend on real hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdevCaptureFactory;

impl CaptureFactory for CdevCaptureFactory {
    fn open(
        &self,
        config: &ReceiverConfig,
        options: CaptureOptions,
    ) -> Result<Box<dyn PulseCapture>, ReceiverError> {
        config.validate()?;
        let claim = ReceiverClaim::acquire(&config.chip)?;
        info!(backend = %config.backend, chip = %config.chip, "opening receiver");

        match config.backend {
            BackendKind::EdgeEvents => {
                let source = CdevEdgeSource::open(config)?;
                let reader = EdgeEventReader::start_claimed(claim, config, options, source)?;
                Ok(Box::new(reader))
            }
            BackendKind::Alerts => {
                let source = CdevAlertSource::new(config);
                let reader = AlertReader::start_claimed(claim, config, options, source)?;
                Ok(Box::new(reader))
            }
        }
    }
}

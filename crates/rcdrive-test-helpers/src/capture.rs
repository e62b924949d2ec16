//! Capture factory over scripted sources

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rcdrive_errors::ReceiverError;
use rcdrive_receiver::{
    AlertReader, BackendKind, CaptureFactory, CaptureOptions, EdgeEventReader, PulseCapture,
    ReceiverClaim, ReceiverConfig,
};

use crate::alerts::{AlertFeed, scripted_alerts};
use crate::edges::{EdgeFeed, scripted_edges};

#[derive(Debug, Default)]
struct FactoryState {
    edge_feed: Option<EdgeFeed>,
    alert_feed: Option<AlertFeed>,
}

/// [`CaptureFactory`] that starts the real readers over scripted sources.
///
/// The feed for the most recently opened reader is kept so tests can drive
/// it after handing the factory to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCaptureFactory {
    state: Arc<Mutex<FactoryState>>,
    fail_next: Arc<AtomicBool>,
    opens: Arc<AtomicUsize>,
}

impl ScriptedCaptureFactory {
    /// Factory with no readers opened yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed of the last edge-event reader opened.
    pub fn edge_feed(&self) -> Option<EdgeFeed> {
        self.state.lock().edge_feed.clone()
    }

    /// Feed of the last alert reader opened.
    pub fn alert_feed(&self) -> Option<AlertFeed> {
        self.state.lock().alert_feed.clone()
    }

    /// Make the next `open` fail as if the chip were missing.
    pub fn fail_next_open(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Successful opens so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl CaptureFactory for ScriptedCaptureFactory {
    fn open(
        &self,
        config: &ReceiverConfig,
        options: CaptureOptions,
    ) -> Result<Box<dyn PulseCapture>, ReceiverError> {
        config.validate()?;
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ReceiverError::unavailable(&config.chip, "no such device"));
        }
        let claim = ReceiverClaim::acquire(&config.chip)?;

        let capture: Box<dyn PulseCapture> = match config.backend {
            BackendKind::EdgeEvents => {
                let (feed, source) = scripted_edges();
                let reader = EdgeEventReader::start_claimed(claim, config, options, source)?;
                self.state.lock().edge_feed = Some(feed);
                Box::new(reader)
            }
            BackendKind::Alerts => {
                let (feed, source) = scripted_alerts();
                let reader = AlertReader::start_claimed(claim, config, options, source)?;
                self.state.lock().alert_feed = Some(feed);
                Box::new(reader)
            }
        };
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(capture)
    }
}

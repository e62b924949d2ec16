//! Where edge events come from

use std::time::Duration;

use crate::event::EdgeEvent;
use crate::ReceiverError;

/// A batched stream of edge events for every monitored line.
///
/// The capture thread owns the source and drops it on exit, which must
/// release the underlying line request.
pub trait EdgeSource: Send + 'static {
    /// Wait up to `timeout` for edges, then append at most `max` of them
    /// to `events`. Returns how many were appended; zero means the wait
    /// timed out.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::EventSource`] if reading events failed. The capture
    /// thread counts the error and keeps going.
    fn wait_events(
        &mut self,
        timeout: Duration,
        events: &mut Vec<EdgeEvent>,
        max: usize,
    ) -> Result<usize, ReceiverError>;
}

/// What a per-pin watcher reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// The pin changed level.
    Edge(EdgeEvent),
    /// No edge within the pin's watchdog period.
    WatchdogExpired,
}

/// Receives alerts for one pin. Called from the source's own thread.
pub type AlertHandler = Box<dyn Fn(Alert) + Send + Sync>;

/// Per-pin alert registration.
pub trait AlertSource: Send {
    /// Start watching `gpio`, reporting through `handler`. A pin with no
    /// edges for `watchdog` gets a [`Alert::WatchdogExpired`]; `None`
    /// disables expiry for the pin.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::LineRequest`] or [`ReceiverError::ThreadSpawn`] if
    /// the pin cannot be watched.
    fn watch(
        &mut self,
        gpio: u32,
        watchdog: Option<Duration>,
        handler: AlertHandler,
    ) -> Result<(), ReceiverError>;

    /// Stop every watcher and wait for them. No handler runs afterwards.
    ///
    /// # Errors
    ///
    /// Reports watchers that ended abnormally.
    fn release_all(&mut self) -> Result<(), ReceiverError>;
}

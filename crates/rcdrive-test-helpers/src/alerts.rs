//! Scripted per-pin alert source

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rcdrive_errors::ReceiverError;
use rcdrive_receiver::{Alert, AlertHandler, AlertSource, EdgeEvent};

#[derive(Default)]
struct AlertState {
    handlers: BTreeMap<u32, AlertHandler>,
    watched: Vec<(u32, Option<Duration>)>,
    failing: BTreeSet<u32>,
    releases: usize,
}

/// Create a connected feed/source pair.
pub fn scripted_alerts() -> (AlertFeed, ScriptedAlertSource) {
    let state = Arc::new(Mutex::new(AlertState::default()));
    (
        AlertFeed {
            state: Arc::clone(&state),
        },
        ScriptedAlertSource { state },
    )
}

/// Test side of a scripted alert source: fires alerts synchronously on the
/// calling thread.
#[derive(Clone)]
pub struct AlertFeed {
    state: Arc<Mutex<AlertState>>,
}

impl std::fmt::Debug for AlertFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertFeed")
            .field("watched", &self.watched())
            .finish_non_exhaustive()
    }
}

impl AlertFeed {
    /// Make `watch` fail for `gpio`.
    pub fn failing_on(&self, gpio: u32) {
        self.state.lock().failing.insert(gpio);
    }

    /// Deliver `alert` to the handler for `gpio`. Returns false if the pin
    /// is not watched.
    pub fn fire(&self, gpio: u32, alert: Alert) -> bool {
        let state = self.state.lock();
        match state.handlers.get(&gpio) {
            Some(handler) => {
                handler(alert);
                true
            }
            None => false,
        }
    }

    /// Deliver one complete pulse on `gpio`.
    pub fn pulse(&self, gpio: u32, rise_ns: u64, width_us: u32) -> bool {
        self.fire(gpio, Alert::Edge(EdgeEvent::rising(gpio, rise_ns)))
            && self.fire(
                gpio,
                Alert::Edge(EdgeEvent::falling(
                    gpio,
                    rise_ns + u64::from(width_us) * 1_000,
                )),
            )
    }

    /// Pins currently watched, with their watchdog periods.
    pub fn watched(&self) -> Vec<(u32, Option<Duration>)> {
        let state = self.state.lock();
        state
            .watched
            .iter()
            .filter(|(gpio, _)| state.handlers.contains_key(gpio))
            .copied()
            .collect()
    }

    /// How many times `release_all` ran.
    pub fn release_count(&self) -> usize {
        self.state.lock().releases
    }
}

/// [`AlertSource`] driven by an [`AlertFeed`].
pub struct ScriptedAlertSource {
    state: Arc<Mutex<AlertState>>,
}

impl std::fmt::Debug for ScriptedAlertSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedAlertSource").finish_non_exhaustive()
    }
}

impl AlertSource for ScriptedAlertSource {
    fn watch(
        &mut self,
        gpio: u32,
        watchdog: Option<Duration>,
        handler: AlertHandler,
    ) -> Result<(), ReceiverError> {
        let mut state = self.state.lock();
        if state.failing.contains(&gpio) {
            return Err(ReceiverError::LineRequest {
                reason: format!("GPIO {gpio} busy"),
            });
        }
        state.handlers.insert(gpio, handler);
        state.watched.push((gpio, watchdog));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), ReceiverError> {
        let mut state = self.state.lock();
        state.handlers.clear();
        state.watched.clear();
        state.releases += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fire_reaches_handler_until_released() -> Result<(), ReceiverError> {
        let (feed, mut source) = scripted_alerts();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        source.watch(
            23,
            Some(Duration::from_millis(100)),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )?;

        assert!(feed.pulse(23, 0, 1_500));
        assert!(!feed.fire(24, Alert::WatchdogExpired));
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        source.release_all()?;
        assert!(!feed.fire(23, Alert::WatchdogExpired));
        assert_eq!(feed.release_count(), 1);
        assert!(feed.watched().is_empty());
        Ok(())
    }

    #[test]
    fn test_failing_pin() {
        let (feed, mut source) = scripted_alerts();
        feed.failing_on(24);
        let result = source.watch(24, None, Box::new(|_| {}));
        assert!(matches!(result, Err(ReceiverError::LineRequest { .. })));
    }
}

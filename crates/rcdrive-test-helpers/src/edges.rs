//! Scripted edge sources and pulse trains

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use rcdrive_errors::ReceiverError;
use rcdrive_receiver::{EdgeEvent, EdgeSource};

#[derive(Debug)]
enum ScriptItem {
    Event(EdgeEvent),
    Error(String),
}

/// Create a connected feed/source pair.
pub fn scripted_edges() -> (EdgeFeed, ScriptedEdgeSource) {
    let (tx, rx) = channel::unbounded();
    let dropped = Arc::new(AtomicBool::new(false));
    (
        EdgeFeed {
            tx,
            dropped: Arc::clone(&dropped),
        },
        ScriptedEdgeSource {
            rx,
            pending_error: None,
            dropped,
        },
    )
}

/// Test side of a scripted source: pushes events and errors.
#[derive(Debug, Clone)]
pub struct EdgeFeed {
    tx: Sender<ScriptItem>,
    dropped: Arc<AtomicBool>,
}

impl EdgeFeed {
    /// Queue one event. Returns false once the source is gone.
    pub fn send(&self, event: EdgeEvent) -> bool {
        self.tx.send(ScriptItem::Event(event)).is_ok()
    }

    /// Queue several events in order.
    pub fn send_all(&self, events: impl IntoIterator<Item = EdgeEvent>) -> bool {
        events.into_iter().all(|event| self.send(event))
    }

    /// Queue one complete pulse: rising at `rise_ns`, falling `width_us` later.
    pub fn pulse(&self, gpio: u32, rise_ns: u64, width_us: u32) -> bool {
        self.send(EdgeEvent::rising(gpio, rise_ns))
            && self.send(EdgeEvent::falling(
                gpio,
                rise_ns + u64::from(width_us) * 1_000,
            ))
    }

    /// Make the next wait fail with `message`.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.tx.send(ScriptItem::Error(message.into())).is_ok()
    }

    /// Whether the source has been dropped (its "line request" released).
    pub fn is_source_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// [`EdgeSource`] fed from an [`EdgeFeed`] over a channel.
#[derive(Debug)]
pub struct ScriptedEdgeSource {
    rx: Receiver<ScriptItem>,
    pending_error: Option<String>,
    dropped: Arc<AtomicBool>,
}

impl EdgeSource for ScriptedEdgeSource {
    fn wait_events(
        &mut self,
        timeout: Duration,
        events: &mut Vec<EdgeEvent>,
        max: usize,
    ) -> Result<usize, ReceiverError> {
        if let Some(message) = self.pending_error.take() {
            return Err(ReceiverError::EventSource(message));
        }

        let first = match self.rx.recv_timeout(timeout) {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => return Ok(0),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                return Ok(0);
            }
        };

        let before = events.len();
        let mut next = Some(first);
        while let Some(item) = next.take() {
            match item {
                ScriptItem::Event(event) => events.push(event),
                ScriptItem::Error(message) if events.len() == before => {
                    return Err(ReceiverError::EventSource(message));
                }
                ScriptItem::Error(message) => {
                    self.pending_error = Some(message);
                    break;
                }
            }
            if events.len() - before < max {
                next = self.rx.try_recv().ok();
            }
        }
        Ok(events.len() - before)
    }
}

impl Drop for ScriptedEdgeSource {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Builder for a regular train of pulses on one line.
#[derive(Debug, Clone)]
pub struct PulseTrain {
    gpio: u32,
    start_ns: u64,
    period_us: u64,
    widths: Vec<u32>,
}

impl PulseTrain {
    /// Empty train on `gpio`, 20 ms frame period, starting at 1 s.
    pub fn new(gpio: u32) -> Self {
        Self {
            gpio,
            start_ns: 1_000_000_000,
            period_us: 20_000,
            widths: Vec::new(),
        }
    }

    /// First rising edge at `start_ns`.
    pub fn starting_at_ns(mut self, start_ns: u64) -> Self {
        self.start_ns = start_ns;
        self
    }

    /// Time between rising edges.
    pub fn period_us(mut self, period_us: u64) -> Self {
        self.period_us = period_us;
        self
    }

    /// Append one pulse.
    pub fn pulse(mut self, width_us: u32) -> Self {
        self.widths.push(width_us);
        self
    }

    /// Append `count` identical pulses.
    pub fn repeat(mut self, width_us: u32, count: usize) -> Self {
        self.widths.extend(std::iter::repeat_n(width_us, count));
        self
    }

    /// Number of pulses.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Whether the train has no pulses.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Rising edge time of the pulse after the last one.
    pub fn end_ns(&self) -> u64 {
        self.start_ns + self.period_us * 1_000 * self.widths.len() as u64
    }

    /// Rising/falling event pairs in time order.
    pub fn events(&self) -> Vec<EdgeEvent> {
        let mut rise_ns = self.start_ns;
        let mut events = Vec::with_capacity(self.widths.len() * 2);
        for width in &self.widths {
            events.push(EdgeEvent::rising(self.gpio, rise_ns));
            events.push(EdgeEvent::falling(
                self.gpio,
                rise_ns + u64::from(*width) * 1_000,
            ));
            rise_ns += self.period_us * 1_000;
        }
        events
    }
}

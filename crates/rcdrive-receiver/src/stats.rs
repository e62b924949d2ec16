//! Capture counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a reader's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Edge events handled, mapped or not
    pub events: u64,
    /// Completed pulses measured
    pub pulses: u64,
    /// Events on offsets no line is mapped to
    pub unmapped_events: u64,
    /// Failed reads from the edge source
    pub source_errors: u64,
    /// Per-pin watchdog expiries (alert backend)
    pub watchdog_expiries: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    events: AtomicU64,
    pulses: AtomicU64,
    unmapped_events: AtomicU64,
    source_errors: AtomicU64,
    watchdog_expiries: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn pulse(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unmapped(&self) {
        self.unmapped_events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn source_error(&self) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn watchdog_expiry(&self) {
        self.watchdog_expiries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            events: self.events.load(Ordering::Relaxed),
            pulses: self.pulses.load(Ordering::Relaxed),
            unmapped_events: self.unmapped_events.load(Ordering::Relaxed),
            source_errors: self.source_errors.load(Ordering::Relaxed),
            watchdog_expiries: self.watchdog_expiries.load(Ordering::Relaxed),
        }
    }
}

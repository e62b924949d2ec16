//! Offset-indexed set of pulse lines

use std::collections::BTreeMap;

use crate::config::{FailsafePolicy, MAX_LINE_OFFSET, ReceiverConfig};
use crate::event::{EdgeEvent, EdgeKind};
use crate::line::{CompletedPulse, PulseCallback, PulseLine};
use crate::reading::{LossReason, PulseReading};
use crate::ReceiverError;

const INDEX_SIZE: usize = MAX_LINE_OFFSET as usize;

/// What an edge did to the table.
#[derive(Debug)]
pub enum EdgeOutcome {
    /// No line is mapped to the event's offset.
    Unmapped,
    /// A rising edge was recorded.
    Rising,
    /// A falling edge arrived with no pending rise, or went backwards.
    Ignored,
    /// A falling edge completed a pulse.
    Pulse(CompletedPulse),
}

/// All lines of one reader, looked up by chip offset.
#[derive(Debug)]
pub struct LineTable {
    lines: Vec<PulseLine>,
    index: [Option<usize>; INDEX_SIZE],
    policy: FailsafePolicy,
    deadband_us: u32,
}

impl LineTable {
    /// Build the table for `config`, attaching `callbacks` by GPIO.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::InvalidConfig`] if the configuration does not
    /// validate or a callback names an unmonitored GPIO.
    pub fn new(
        config: &ReceiverConfig,
        callbacks: &BTreeMap<u32, PulseCallback>,
    ) -> Result<Self, ReceiverError> {
        config.validate()?;
        if let Some(gpio) = callbacks
            .keys()
            .find(|gpio| !config.lines.iter().any(|line| line.gpio == **gpio))
        {
            return Err(ReceiverError::invalid_config(format!(
                "callback registered for unmonitored line {gpio}"
            )));
        }

        let mut index = [None; INDEX_SIZE];
        let mut lines = Vec::with_capacity(config.lines.len());
        for (i, line) in config.lines.iter().enumerate() {
            let slot = usize::try_from(line.gpio)
                .ok()
                .and_then(|offset| index.get_mut(offset))
                .ok_or_else(|| {
                    ReceiverError::invalid_config(format!("line offset {} out of range", line.gpio))
                })?;
            *slot = Some(i);
            lines.push(PulseLine::new(line, callbacks.get(&line.gpio).cloned()));
        }

        Ok(Self {
            lines,
            index,
            policy: config.failsafe,
            deadband_us: config.hold_deadband_us,
        })
    }

    fn position(&self, gpio: u32) -> Option<usize> {
        usize::try_from(gpio)
            .ok()
            .and_then(|offset| self.index.get(offset).copied().flatten())
    }

    /// The line monitoring `gpio`.
    pub fn line(&self, gpio: u32) -> Option<&PulseLine> {
        self.position(gpio).and_then(|i| self.lines.get(i))
    }

    fn line_mut(&mut self, gpio: u32) -> Option<&mut PulseLine> {
        self.position(gpio).and_then(|i| self.lines.get_mut(i))
    }

    /// Feed one edge, seen at `now_us`.
    pub fn apply(&mut self, event: &EdgeEvent, now_us: u64) -> EdgeOutcome {
        let policy = self.policy;
        let deadband_us = self.deadband_us;
        let Some(line) = self.line_mut(event.offset) else {
            return EdgeOutcome::Unmapped;
        };

        match event.kind {
            EdgeKind::Rising => {
                line.on_rising(event.timestamp_us(), now_us);
                EdgeOutcome::Rising
            }
            EdgeKind::Falling => match line.on_falling(event.timestamp_us(), &policy, deadband_us) {
                Some(pulse) => EdgeOutcome::Pulse(pulse),
                None => EdgeOutcome::Ignored,
            },
        }
    }

    /// Reading for `gpio` at `now_us`.
    pub fn read(&self, gpio: u32, now_us: u64) -> PulseReading {
        match self.line(gpio) {
            Some(line) => line.reading(now_us, &self.policy),
            None => PulseReading::Lost(LossReason::Unmapped),
        }
    }

    /// Clear `gpio`'s stored width after a watchdog expiry. Returns whether
    /// a line with an enabled watchdog was cleared.
    pub fn expire(&mut self, gpio: u32) -> bool {
        self.line_mut(gpio).is_some_and(PulseLine::expire)
    }

    /// Monitored GPIOs in configuration order.
    pub fn gpios(&self) -> Vec<u32> {
        self.lines.iter().map(PulseLine::gpio).collect()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the table has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

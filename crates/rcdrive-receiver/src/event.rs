//! Edge events as delivered by a GPIO chip

/// Signal transition direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

/// One timestamped edge on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Line offset on the chip
    pub offset: u32,
    /// Transition direction
    pub kind: EdgeKind,
    /// Kernel timestamp, monotonic clock, nanoseconds
    pub timestamp_ns: u64,
}

impl EdgeEvent {
    /// Rising edge on `offset` at `timestamp_ns`.
    pub fn rising(offset: u32, timestamp_ns: u64) -> Self {
        Self {
            offset,
            kind: EdgeKind::Rising,
            timestamp_ns,
        }
    }

    /// Falling edge on `offset` at `timestamp_ns`.
    pub fn falling(offset: u32, timestamp_ns: u64) -> Self {
        Self {
            offset,
            kind: EdgeKind::Falling,
            timestamp_ns,
        }
    }

    /// Timestamp truncated to microseconds.
    pub fn timestamp_us(&self) -> u64 {
        self.timestamp_ns / 1_000
    }
}

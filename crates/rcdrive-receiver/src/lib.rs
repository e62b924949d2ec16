//! RC receiver pulse capture
//!
//! Measures the high time of each receiver channel's PWM signal from
//! timestamped GPIO edges and flags two kinds of signal loss:
//!
//! - **stale**: no rising edge within the line's watchdog timeout (receiver
//!   off or out of range);
//! - **failsafe**: a run of pulses matching the receiver's failsafe value
//!   (the receiver is still transmitting, but reports "no input").
//!
//! Two backends implement [`PulseCapture`]:
//!
//! - [`EdgeEventReader`]: one batched line request drained by a single
//!   capture thread;
//! - [`AlertReader`]: per-pin edge and watchdog alerts.
//!
//! Hardware sources for both live in [`cdev`] behind the `cdev` feature.
//! Only one reader may own a GPIO chip at a time; see [`ReceiverClaim`].

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod alerts;
pub mod batched;
pub mod capture;
#[cfg(feature = "cdev")]
#[cfg_attr(docsrs, doc(cfg(feature = "cdev")))]
pub mod cdev;
pub mod clock;
pub mod config;
pub mod event;
pub mod guard;
pub mod line;
pub mod reading;
pub mod source;
pub mod stats;
pub mod table;

pub use alerts::AlertReader;
pub use batched::EdgeEventReader;
pub use capture::{CaptureFactory, CaptureOptions, PulseCapture};
pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use config::{BackendKind, FailsafePolicy, LineConfig, ReceiverConfig};
pub use event::{EdgeEvent, EdgeKind};
pub use guard::ReceiverClaim;
pub use line::PulseCallback;
pub use rcdrive_errors::ReceiverError;
pub use reading::{LOST_PULSE, LossReason, PulseReading};
pub use source::{Alert, AlertHandler, AlertSource, EdgeSource};
pub use stats::CaptureStats;

/// Result type for receiver operations.
pub type ReceiverResult<T> = Result<T, ReceiverError>;

//! Shared test utilities for RcDrive.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with `#[track_caller]`
//! - [`bus`] - Register-file I2C mock
//! - [`edges`] - Scripted edge sources and pulse trains
//! - [`alerts`] - Scripted per-pin alert source
//! - [`capture`] - Capture factory over scripted sources
//! - [`pwm`] - Recording PWM output
//! - [`wait`] - Polling helpers for background threads
//!
//! ```rust,ignore
//! use rcdrive_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod alerts;
pub mod bus;
pub mod capture;
pub mod edges;
pub mod must;
pub mod prelude;
pub mod pwm;
pub mod wait;

pub use alerts::{AlertFeed, ScriptedAlertSource, scripted_alerts};
pub use bus::{BusTransaction, MockBus};
pub use capture::ScriptedCaptureFactory;
pub use edges::{EdgeFeed, PulseTrain, ScriptedEdgeSource, scripted_edges};
pub use must::{must, must_some};
pub use pwm::{PwmWrite, RecordingOutput};
pub use wait::{wait_until, wait_until_default};

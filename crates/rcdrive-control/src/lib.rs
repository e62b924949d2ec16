//! Receiver channel mapping and actuator command translation
//!
//! The two ends of the control chain:
//!
//! - [`ChannelMapper`] turns raw receiver pulse widths into percentages in
//!   `[-100, 100]` using per-channel [`CalibrationRange`]s. Signal loss maps
//!   to [`ChannelReading::NoSignal`], never to an error.
//! - [`ActuatorTranslator`] turns steering and throttle percentages, or
//!   camera pulse widths, into duty ticks and writes them through a
//!   [`PwmOutput`](rcdrive_pca9685::PwmOutput).
//!
//! # Example
//!
//! ```
//! use rcdrive_control::{EscCurve, SteeringCurve};
//!
//! let esc = EscCurve::default();
//! assert_eq!(esc.duty_for(0), 400);
//! assert_eq!(esc.duty_for(100), 535);
//!
//! let steering = SteeringCurve::default();
//! assert_eq!(steering.duty_for(-100), 250);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod actuator;
pub mod calibration;
pub mod interp;
pub mod mapper;
pub mod translator;

pub use actuator::{Actuator, ActuatorConfig, CameraConfig, EscCurve, SteeringCurve};
pub use calibration::{CalibrationConfig, CalibrationRange, ReceiverProfile};
pub use mapper::{Channel, ChannelMapper, ChannelReading, MapperConfig, NO_SIGNAL_PERCENT};
pub use translator::ActuatorTranslator;

//! RC vehicle control chain
//!
//! Ties the layers together behind one owned context, [`RcVehicle`]:
//!
//! ```text
//! receiver lines ─▶ PulseCapture ─▶ ChannelMapper ─▶ (control logic)
//!                                                        │
//! I2C bus ◀─ Pca9685 ◀─ ActuatorTranslator ◀─────────────┘
//! ```
//!
//! Everything is configured from one YAML document, [`VehicleConfig`].
//! With the `hardware` feature, [`RcVehicle::from_hardware`] opens the
//! Linux I2C bus and GPIO chip; otherwise callers inject a
//! [`BusOpener`](rcdrive_i2c::BusOpener) and a
//! [`CaptureFactory`](rcdrive_receiver::CaptureFactory).

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod vehicle;

pub use config::VehicleConfig;
pub use rcdrive_control::{Actuator, Channel, ChannelReading, NO_SIGNAL_PERCENT};
pub use rcdrive_errors::{RcDriveError, Result};
pub use vehicle::RcVehicle;

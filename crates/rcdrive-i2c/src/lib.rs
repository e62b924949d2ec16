//! Serialized register access on a shared I2C bus
//!
//! [`I2cBus`] owns one bus device node. Every register read or write takes
//! the bus lock for exactly one transaction, so concurrent callers never
//! interleave the bytes of a single access. Multi-register sequences are not
//! atomic; callers touching the same registers from several threads must
//! serialize themselves.
//!
//! The hardware sits behind [`BusOpener`] / [`BusDevice`], with
//! [`LinuxI2cOpener`] talking to `/dev/i2c-N` and test code substituting a
//! register-file mock.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod bus;
pub mod config;
pub mod device;
#[cfg(target_os = "linux")]
pub mod linux;

pub use bus::I2cBus;
pub use config::{BusConfig, DEFAULT_BUS_DEVICE};
pub use device::{BusDevice, BusOpener};
#[cfg(target_os = "linux")]
pub use linux::{LinuxI2cDevice, LinuxI2cOpener};
pub use rcdrive_errors::BusError;

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

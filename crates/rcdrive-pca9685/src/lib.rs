//! PCA9685 16-channel PWM driver
//!
//! Programs the chip's clock prescaler and per-channel on/off tick registers
//! through a shared [`I2cBus`](rcdrive_i2c::I2cBus). Pulse widths in
//! microseconds are converted to 12-bit ticks against the configured output
//! frequency (50 Hz for analog servos, a 20 ms cycle).

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod conversion;
pub mod driver;
pub mod registers;

pub use config::DriverConfig;
pub use conversion::{cycle_us, duty_to_microseconds, microseconds_to_duty, prescale_for};
pub use driver::{Pca9685, PwmOutput};
pub use rcdrive_errors::DriverError;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

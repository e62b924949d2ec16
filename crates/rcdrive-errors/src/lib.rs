//! Error types for RcDrive
//!
//! Every layer of the receiver → mapper → actuator chain reports failures
//! through its own error enum. All of them convert into [`RcDriveError`]
//! so callers at the top of the stack can propagate with `?`.
//!
//! # Architecture
//!
//! - [`bus`]: I2C bus access errors
//! - [`driver`]: PWM output chip errors
//! - [`receiver`]: GPIO edge capture errors
//! - [`config`]: configuration loading and validation errors
//! - [`common`]: the top-level error, severity and category
//!
//! Signal loss is deliberately *not* represented here. A lost receiver
//! channel is an ordinary reading, not a failure.
//!
//! # Example
//!
//! ```
//! use rcdrive_errors::prelude::*;
//!
//! fn check_open(open: bool) -> Result<()> {
//!     if !open {
//!         return Err(BusError::NotInitialized.into());
//!     }
//!     Ok(())
//! }
//!
//! let err = check_open(false).err();
//! assert!(matches!(err, Some(RcDriveError::Bus(BusError::NotInitialized))));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bus;
pub mod common;
pub mod config;
pub mod driver;
pub mod prelude;
pub mod receiver;

pub use bus::BusError;
pub use common::{ErrorCategory, ErrorSeverity, RcDriveError};
pub use config::ConfigError;
pub use driver::DriverError;
pub use receiver::ReceiverError;

/// A specialized `Result` type for RcDrive operations.
pub type Result<T> = std::result::Result<T, RcDriveError>;

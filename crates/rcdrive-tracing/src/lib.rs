//! Log subscriber setup for RcDrive
//!
//! Every component logs through [`tracing`]. This crate installs the one
//! global subscriber, writing lines of the form
//!
//! ```text
//! [2025-03-01 14:02:11] [INFO] [rcdrive_pca9685::driver] PWM frequency set to 50 Hz
//! ```
//!
//! to an append-only log file and, optionally, to the console. The tag is the
//! event's target, which defaults to the emitting module path.
//!
//! # Example
//!
//! ```rust,ignore
//! use rcdrive_tracing::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!("receiver ready");
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod format;
pub mod init;

pub use config::LogConfig;
pub use error::LoggingError;
pub use format::{LineFormat, format_line};
pub use init::init_logging;

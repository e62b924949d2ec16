//! Prelude module for convenient error handling imports.

pub use crate::{
    Result,
    bus::BusError,
    common::{ErrorCategory, ErrorSeverity, RcDriveError},
    config::ConfigError,
    driver::DriverError,
    receiver::ReceiverError,
};

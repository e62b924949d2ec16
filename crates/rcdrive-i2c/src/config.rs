//! Bus configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default bus device node (the Raspberry Pi header bus).
pub const DEFAULT_BUS_DEVICE: &str = "/dev/i2c-1";

/// Which bus device node to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Device node path
    pub device: PathBuf,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_BUS_DEVICE),
        }
    }
}

impl BusConfig {
    /// Use a different device node.
    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = device.into();
        self
    }
}

//! Hardware seam between [`I2cBus`](crate::I2cBus) and a bus device node

use std::fmt::Debug;
use std::io;
use std::path::Path;

/// One open bus device.
///
/// Implementations perform raw transfers only; locking, validation and
/// short-transfer detection live in [`I2cBus`](crate::I2cBus).
pub trait BusDevice: Send + Debug {
    /// Select the 7-bit slave address for subsequent transfers.
    fn set_slave(&mut self, address: u8) -> io::Result<()>;

    /// Write `bytes` as one transfer, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read into `buf` as one transfer, returning how many were received.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens bus device nodes.
pub trait BusOpener: Send + Sync + Debug {
    /// Open the device node at `path`.
    fn open(&self, path: &Path) -> io::Result<Box<dyn BusDevice>>;
}

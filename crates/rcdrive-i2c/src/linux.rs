//! Linux `/dev/i2c-N` device

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::{BusDevice, BusOpener};

/// `I2C_SLAVE` from `<linux/i2c-dev.h>`.
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// Opens `/dev/i2c-N` nodes read/write.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxI2cOpener;

impl BusOpener for LinuxI2cOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BusDevice>> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Box::new(LinuxI2cDevice { file }))
    }
}

/// An open i2c-dev character device.
#[derive(Debug)]
pub struct LinuxI2cDevice {
    file: File,
}

impl BusDevice for LinuxI2cDevice {
    #[expect(unsafe_code, reason = "I2C_SLAVE has no safe wrapper in std")]
    fn set_slave(&mut self, address: u8) -> io::Result<()> {
        let fd = self.file.as_raw_fd();
        // SAFETY: `fd` is an open descriptor owned by `self.file`, and
        // I2C_SLAVE takes the address by value, so no memory is shared.
        let rc = unsafe { libc::ioctl(fd, I2C_SLAVE, libc::c_ulong::from(address)) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.file.write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

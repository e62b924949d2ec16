//! The shared bus handle

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info};

use crate::{BusConfig, BusDevice, BusError, BusOpener, BusResult};

/// Highest valid 7-bit slave address.
pub const MAX_SLAVE_ADDRESS: u8 = 0x7f;

#[derive(Debug, Default)]
struct BusState {
    device: Option<Box<dyn BusDevice>>,
    slave: Option<u8>,
}

/// A shared I2C bus.
///
/// All methods take `&self`; wrap the bus in an `Arc` to share it between
/// the PWM driver and anything else on the same wires.
pub struct I2cBus {
    path: PathBuf,
    opener: Box<dyn BusOpener>,
    state: Mutex<BusState>,
}

impl fmt::Debug for I2cBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I2cBus")
            .field("path", &self.path)
            .field("opener", &self.opener)
            .finish_non_exhaustive()
    }
}

impl I2cBus {
    /// Create a closed bus for the device node at `path`.
    pub fn new(path: impl Into<PathBuf>, opener: impl BusOpener + 'static) -> Self {
        Self {
            path: path.into(),
            opener: Box::new(opener),
            state: Mutex::new(BusState::default()),
        }
    }

    /// Create a closed bus from configuration.
    pub fn from_config(config: &BusConfig, opener: impl BusOpener + 'static) -> Self {
        Self::new(config.device.clone(), opener)
    }

    /// Device node path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the device node. Opening an already open bus succeeds without
    /// touching the device.
    ///
    /// # Errors
    ///
    /// [`BusError::DeviceUnavailable`] if the node cannot be opened,
    /// [`BusError::Lock`] if the bus lock is poisoned.
    pub fn open(&self) -> BusResult<()> {
        let mut state = self.lock("open")?;
        if state.device.is_some() {
            info!(device = %self.path.display(), "I2C bus already open");
            return Ok(());
        }

        let device = self.opener.open(&self.path).map_err(|e| {
            error!(device = %self.path.display(), "failed to open I2C bus: {e}");
            BusError::unavailable(self.path.display().to_string(), e)
        })?;
        state.device = Some(device);
        state.slave = None;
        info!(device = %self.path.display(), "I2C bus opened");
        Ok(())
    }

    /// Select the slave device for subsequent transactions.
    ///
    /// # Errors
    ///
    /// [`BusError::NotInitialized`] before [`open`](Self::open),
    /// [`BusError::AddressRejected`] for addresses above 0x7f or when the
    /// kernel refuses the address.
    pub fn set_slave(&self, address: u8) -> BusResult<()> {
        let mut state = self.lock("set_slave")?;
        let device = state.device.as_mut().ok_or(BusError::NotInitialized)?;

        if address > MAX_SLAVE_ADDRESS {
            return Err(BusError::AddressRejected {
                address,
                reason: "not a 7-bit address".to_string(),
            });
        }

        device.set_slave(address).map_err(|e| {
            error!("failed to select I2C slave {address:#04x}: {e}");
            BusError::AddressRejected {
                address,
                reason: e.to_string(),
            }
        })?;
        state.slave = Some(address);
        info!("I2C slave set to {address:#04x}");
        Ok(())
    }

    /// Write one register.
    ///
    /// # Errors
    ///
    /// [`BusError::NotInitialized`] before [`open`](Self::open), in which case
    /// the device is not touched. [`BusError::Transfer`] if fewer than two
    /// bytes were written.
    pub fn write_byte(&self, register: u8, value: u8) -> BusResult<()> {
        let mut state = self.lock("write_byte")?;
        let device = state.device.as_mut().ok_or(BusError::NotInitialized)?;

        let written = device
            .write(&[register, value])
            .map_err(|e| BusError::transfer(register, e.to_string()))?;
        if written != 2 {
            error!("short I2C write to register {register:#04x}: {written} of 2 bytes");
            return Err(BusError::short_transfer(register, 2, written));
        }

        debug!("wrote {value:#04x} to register {register:#04x}");
        Ok(())
    }

    /// Read one register.
    ///
    /// # Errors
    ///
    /// Same conditions as [`write_byte`](Self::write_byte), for either the
    /// register-select write or the data read.
    pub fn read_byte(&self, register: u8) -> BusResult<u8> {
        let mut state = self.lock("read_byte")?;
        let device = state.device.as_mut().ok_or(BusError::NotInitialized)?;

        let written = device
            .write(&[register])
            .map_err(|e| BusError::transfer(register, e.to_string()))?;
        if written != 1 {
            error!("short I2C register select {register:#04x}: {written} of 1 bytes");
            return Err(BusError::short_transfer(register, 1, written));
        }

        let mut buf = [0u8; 1];
        let read = device
            .read(&mut buf)
            .map_err(|e| BusError::transfer(register, e.to_string()))?;
        if read != 1 {
            error!("short I2C read from register {register:#04x}: {read} of 1 bytes");
            return Err(BusError::short_transfer(register, 1, read));
        }

        let [value] = buf;
        debug!("read {value:#04x} from register {register:#04x}");
        Ok(value)
    }

    /// Release the device node. Closing a bus that was never opened is a no-op.
    ///
    /// # Errors
    ///
    /// [`BusError::Lock`] if the bus lock is poisoned.
    pub fn close(&self) -> BusResult<()> {
        let mut state = self.lock("close")?;
        state.slave = None;
        if state.device.take().is_some() {
            info!(device = %self.path.display(), "I2C bus closed");
        }
        Ok(())
    }

    /// Whether the device node is open.
    ///
    /// # Errors
    ///
    /// [`BusError::Lock`] if the bus lock is poisoned.
    pub fn is_open(&self) -> BusResult<bool> {
        Ok(self.lock("is_open")?.device.is_some())
    }

    /// Currently selected slave address.
    ///
    /// # Errors
    ///
    /// [`BusError::Lock`] if the bus lock is poisoned.
    pub fn slave(&self) -> BusResult<Option<u8>> {
        Ok(self.lock("slave")?.slave)
    }

    fn lock(&self, context: &'static str) -> BusResult<MutexGuard<'_, BusState>> {
        self.state.lock().map_err(|poisoned| {
            error!("I2C bus lock failed during {context}: {poisoned}");
            BusError::Lock { context }
        })
    }
}

//! Register-file I2C mock

use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rcdrive_i2c::{BusDevice, BusOpener};

/// One logged device access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusTransaction {
    /// Slave address selected
    SetSlave(u8),
    /// Register written
    Write {
        /// Register
        register: u8,
        /// Value written
        value: u8,
    },
    /// Register read
    Read {
        /// Register
        register: u8,
        /// Value returned
        value: u8,
    },
    /// Device handle dropped
    Close,
}

#[derive(Debug)]
struct MockBusState {
    registers: [u8; 256],
    pointer: u8,
    log: Vec<BusTransaction>,
    opens: usize,
    fail_open: bool,
    reject_slave: bool,
    short_write_on: Option<u8>,
    short_read: bool,
    panic_on_write: bool,
}

impl Default for MockBusState {
    fn default() -> Self {
        Self {
            registers: [0; 256],
            pointer: 0,
            log: Vec::new(),
            opens: 0,
            fail_open: false,
            reject_slave: false,
            short_write_on: None,
            short_read: false,
            panic_on_write: false,
        }
    }
}

/// In-memory 256-register device behind [`BusOpener`].
///
/// Clones share state, so tests keep one clone to inspect what an
/// [`I2cBus`](rcdrive_i2c::I2cBus) did with another. Register-select writes
/// (one byte) are not logged; the following read is.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockBusState>>,
}

impl MockBus {
    /// Fresh device, all registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current register value.
    pub fn register(&self, register: u8) -> u8 {
        self.state
            .lock()
            .registers
            .get(usize::from(register))
            .copied()
            .unwrap_or(0)
    }

    /// Preset a register without logging.
    pub fn set_register(&self, register: u8, value: u8) {
        if let Some(slot) = self.state.lock().registers.get_mut(usize::from(register)) {
            *slot = value;
        }
    }

    /// Every logged access, oldest first.
    pub fn transactions(&self) -> Vec<BusTransaction> {
        self.state.lock().log.clone()
    }

    /// Logged register writes as `(register, value)`.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state
            .lock()
            .log
            .iter()
            .filter_map(|t| match t {
                BusTransaction::Write { register, value } => Some((*register, *value)),
                _ => None,
            })
            .collect()
    }

    /// Forget logged accesses.
    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    /// How many times the device was opened.
    pub fn open_count(&self) -> usize {
        self.state.lock().opens
    }

    /// Make opening fail.
    pub fn fail_open(&self, fail: bool) {
        self.state.lock().fail_open = fail;
    }

    /// Make slave selection fail.
    pub fn reject_slave(&self, reject: bool) {
        self.state.lock().reject_slave = reject;
    }

    /// Accept only one byte of every write to `register`.
    pub fn short_write_on(&self, register: u8) {
        self.state.lock().short_write_on = Some(register);
    }

    /// Return zero bytes from every read.
    pub fn short_read(&self, short: bool) {
        self.state.lock().short_read = short;
    }

    /// Panic inside the next writes, poisoning the bus lock of the
    /// [`I2cBus`](rcdrive_i2c::I2cBus) performing them.
    pub fn panic_on_write(&self, panic: bool) {
        self.state.lock().panic_on_write = panic;
    }

    /// Clear every injected fault.
    pub fn clear_faults(&self) {
        let mut state = self.state.lock();
        state.fail_open = false;
        state.reject_slave = false;
        state.short_write_on = None;
        state.short_read = false;
        state.panic_on_write = false;
    }
}

impl BusOpener for MockBus {
    fn open(&self, _path: &Path) -> io::Result<Box<dyn BusDevice>> {
        let mut state = self.state.lock();
        if state.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "mock bus unavailable",
            ));
        }
        state.opens += 1;
        Ok(Box::new(MockDevice {
            state: Arc::clone(&self.state),
        }))
    }
}

#[derive(Debug)]
struct MockDevice {
    state: Arc<Mutex<MockBusState>>,
}

impl BusDevice for MockDevice {
    fn set_slave(&mut self, address: u8) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.reject_slave {
            return Err(io::Error::other("mock slave rejected"));
        }
        state.log.push(BusTransaction::SetSlave(address));
        Ok(())
    }

    #[expect(clippy::panic, reason = "injected fault for lock poisoning tests")]
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.panic_on_write {
            drop(state);
            panic!("mock bus write fault");
        }
        match *bytes {
            [register] => {
                state.pointer = register;
                Ok(1)
            }
            [register, value] => {
                if state.short_write_on == Some(register) {
                    return Ok(1);
                }
                if let Some(slot) = state.registers.get_mut(usize::from(register)) {
                    *slot = value;
                }
                state.log.push(BusTransaction::Write { register, value });
                Ok(2)
            }
            _ => Ok(0),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if state.short_read {
            return Ok(0);
        }
        let register = state.pointer;
        let value = state
            .registers
            .get(usize::from(register))
            .copied()
            .unwrap_or(0);
        let Some(slot) = buf.first_mut() else {
            return Ok(0);
        };
        *slot = value;
        state.log.push(BusTransaction::Read { register, value });
        Ok(1)
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.state.lock().log.push(BusTransaction::Close);
    }
}

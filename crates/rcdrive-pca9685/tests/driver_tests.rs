//! Register sequencing against a register-file mock.

use std::sync::Arc;
use std::thread;

use rcdrive_i2c::{BusError, I2cBus};
use rcdrive_pca9685::registers::{LED0_ON_L, MODE1, PRESCALE};
use rcdrive_pca9685::{DriverConfig, DriverError, Pca9685};
use rcdrive_test_helpers::{BusTransaction, MockBus};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn driver() -> (Pca9685, MockBus) {
    let mock = MockBus::new();
    let bus = Arc::new(I2cBus::new("/dev/i2c-1", mock.clone()));
    (Pca9685::new(bus, DriverConfig::default()), mock)
}

fn write(register: u8, value: u8) -> BusTransaction {
    BusTransaction::Write { register, value }
}

#[test]
fn init_programs_50hz() -> TestResult {
    let (driver, mock) = driver();
    driver.init()?;

    assert!(driver.is_ready());
    assert_eq!(
        mock.transactions(),
        vec![
            BusTransaction::SetSlave(0x40),
            write(MODE1, 0x00),
            BusTransaction::Read {
                register: MODE1,
                value: 0x00
            },
            write(MODE1, 0x10),
            write(PRESCALE, 121),
            write(MODE1, 0x00),
            write(MODE1, 0x80),
        ]
    );
    Ok(())
}

#[test]
fn init_is_idempotent() -> TestResult {
    let (driver, mock) = driver();
    driver.init()?;
    let after_first = mock.transactions().len();

    driver.init()?;
    assert_eq!(mock.transactions().len(), after_first);
    assert_eq!(mock.open_count(), 1);
    Ok(())
}

#[test]
fn sleep_preserves_other_mode_bits() -> TestResult {
    let (driver, mock) = driver();
    driver.init()?;
    mock.set_register(MODE1, 0xa1);
    mock.clear_log();

    driver.set_frequency(60.0)?;

    assert_eq!(
        mock.writes(),
        vec![
            (MODE1, 0x31),
            (PRESCALE, 101),
            (MODE1, 0xa1),
            (MODE1, 0xa1),
        ]
    );
    assert!((driver.frequency() - 60.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn channel_write_splits_ticks() -> TestResult {
    let (driver, mock) = driver();
    driver.init()?;
    mock.clear_log();

    driver.set_channel_pwm(1, 0, 467)?;

    let base = LED0_ON_L + 4;
    assert_eq!(
        mock.writes(),
        vec![(base, 0), (base + 1, 0), (base + 2, 0xd3), (base + 3, 0x01)]
    );
    Ok(())
}

#[test]
fn channel_write_before_init_is_rejected() {
    let (driver, mock) = driver();

    assert_eq!(
        driver.set_channel_pwm(0, 0, 300),
        Err(DriverError::NotInitialized)
    );
    assert!(mock.transactions().is_empty());
}

#[test]
fn channel_and_tick_bounds_checked_before_bus_access() -> TestResult {
    let (driver, mock) = driver();
    driver.init()?;
    mock.clear_log();

    assert_eq!(
        driver.set_channel_pwm(16, 0, 300),
        Err(DriverError::InvalidChannel(16))
    );
    assert_eq!(
        driver.set_channel_pwm(0, 0, 4096),
        Err(DriverError::TickOutOfRange { value: 4096 })
    );
    assert!(mock.transactions().is_empty());
    Ok(())
}

#[test]
fn failed_init_releases_bus() -> TestResult {
    let (driver, mock) = driver();
    mock.short_write_on(PRESCALE);

    match driver.init() {
        Err(DriverError::Bus(BusError::Transfer { register, .. })) => {
            assert_eq!(register, PRESCALE);
        }
        other => return Err(format!("expected transfer error, got {other:?}").into()),
    }
    assert!(!driver.is_ready());
    assert!(!driver.bus().is_open()?);
    assert_eq!(mock.transactions().last(), Some(&BusTransaction::Close));
    Ok(())
}

#[test]
fn failed_open_is_device_unavailable() {
    let (driver, mock) = driver();
    mock.fail_open(true);

    assert!(matches!(
        driver.init(),
        Err(DriverError::Bus(BusError::DeviceUnavailable { .. }))
    ));
}

#[test]
fn mid_channel_failure_aborts_remaining_writes() -> TestResult {
    let (driver, mock) = driver();
    driver.init()?;
    mock.clear_log();
    mock.short_write_on(LED0_ON_L + 2);

    assert!(driver.set_channel_pwm(0, 0, 300).err().is_some());
    assert_eq!(mock.writes(), vec![(LED0_ON_L, 0), (LED0_ON_L + 1, 0)]);
    Ok(())
}

#[test]
fn shutdown_closes_bus() -> TestResult {
    let (driver, _mock) = driver();
    driver.init()?;
    driver.shutdown()?;

    assert!(!driver.is_ready());
    assert!(!driver.bus().is_open()?);
    assert_eq!(
        driver.set_channel_pwm(0, 0, 300),
        Err(DriverError::NotInitialized)
    );

    driver.init()?;
    assert!(driver.is_ready());
    Ok(())
}

#[test]
fn conversions_follow_frequency() -> TestResult {
    let (driver, _mock) = driver();
    assert!((driver.cycle_us() - 20_000.0).abs() < 1e-9);
    assert_eq!(driver.microseconds_to_duty(1500.0), 307);

    driver.init()?;
    driver.set_frequency(100.0)?;
    assert!((driver.cycle_us() - 10_000.0).abs() < 1e-9);
    assert_eq!(driver.microseconds_to_duty(1500.0), 614);
    Ok(())
}

#[test]
fn poisoned_bus_lock_fails_init() -> TestResult {
    let (driver, mock) = driver();
    driver.bus().open()?;
    mock.panic_on_write(true);

    let writer = thread::scope(|s| s.spawn(|| driver.bus().write_byte(MODE1, 0)).join());
    assert!(writer.err().is_some(), "write should have panicked");
    mock.clear_faults();

    assert!(matches!(
        driver.init(),
        Err(DriverError::Bus(BusError::Lock { context: "is_open" }))
    ));
    assert!(!driver.is_ready());
    Ok(())
}

//! The vehicle context
//!
//! [`RcVehicle`] owns the bus, the PWM driver, the actuator translator and,
//! once started, the receiver capture. It replaces process-wide state:
//! several vehicles over different buses and chips can coexist, which is
//! how the tests run.

use std::sync::Arc;

use parking_lot::Mutex;
use rcdrive_control::{Actuator, ActuatorTranslator, Channel, ChannelMapper, ChannelReading};
use rcdrive_errors::{ConfigError, ReceiverError};
use rcdrive_i2c::{BusOpener, I2cBus};
use rcdrive_pca9685::{DriverResult, Pca9685, PwmOutput};
use rcdrive_receiver::{CaptureFactory, CaptureOptions, CaptureStats, PulseCapture};
use tracing::{debug, info, warn};

use crate::config::VehicleConfig;

/// Driver, translator, mapper and receiver for one car.
pub struct RcVehicle {
    config: VehicleConfig,
    driver: Arc<Pca9685>,
    translator: ActuatorTranslator,
    mapper: ChannelMapper,
    factory: Arc<dyn CaptureFactory>,
    receiver: Mutex<Option<Box<dyn PulseCapture>>>,
}

impl std::fmt::Debug for RcVehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcVehicle")
            .field("driver", &self.driver)
            .field("mapper", &self.mapper)
            .field("factory", &self.factory)
            .field("receiver_running", &self.is_receiver_running())
            .finish_non_exhaustive()
    }
}

impl RcVehicle {
    /// Build a vehicle over `opener`'s bus and `factory`'s receivers.
    /// Nothing touches hardware until [`init_driver`](Self::init_driver) or
    /// [`init_receiver_readers`](Self::init_receiver_readers).
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `config` does not validate.
    pub fn new(
        config: VehicleConfig,
        opener: impl BusOpener + 'static,
        factory: Arc<dyn CaptureFactory>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let bus = Arc::new(I2cBus::from_config(&config.bus, opener));
        let driver = Arc::new(Pca9685::new(bus, config.driver.clone()));
        let translator = ActuatorTranslator::new(Arc::clone(&driver) as Arc<dyn PwmOutput>, config.actuators);
        let mapper = ChannelMapper::new(&config.mapping)?;

        Ok(Self {
            config,
            driver,
            translator,
            mapper,
            factory,
            receiver: Mutex::new(None),
        })
    }

    /// Vehicle on the Linux I2C bus and GPIO character device.
    ///
    /// # Errors
    ///
    /// As for [`new`](Self::new).
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    #[cfg_attr(docsrs, doc(cfg(feature = "hardware")))]
    pub fn from_hardware(config: VehicleConfig) -> Result<Self, ConfigError> {
        Self::new(
            config,
            rcdrive_i2c::LinuxI2cOpener,
            Arc::new(rcdrive_receiver::cdev::CdevCaptureFactory),
        )
    }

    /// Configuration in use.
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// The PWM driver.
    pub fn driver(&self) -> &Arc<Pca9685> {
        &self.driver
    }

    /// Bring up the PWM chip. A no-op once ready, and in dry-run mode,
    /// where the bus is never opened.
    ///
    /// # Errors
    ///
    /// The first bus error; the bus is released again if this call opened
    /// it.
    pub fn init_driver(&self) -> DriverResult<()> {
        if self.config.actuators.dry_run {
            info!("dry run, PWM driver left untouched");
            return Ok(());
        }
        self.driver.init()
    }

    /// Release the bus. The driver must be initialized again before use.
    ///
    /// # Errors
    ///
    /// A bus lock failure.
    pub fn close_driver(&self) -> DriverResult<()> {
        self.driver.shutdown()
    }

    /// Steer to `percent`, -100 full left to 100 full right.
    ///
    /// # Errors
    ///
    /// [`DriverError::NotInitialized`](rcdrive_errors::DriverError::NotInitialized) before [`init_driver`](Self::init_driver),
    /// otherwise the first bus error.
    pub fn set_servo_direction(&self, percent: i32) -> DriverResult<u16> {
        self.translator.set_servo_direction(percent)
    }

    /// Drive at `percent`, -100 full reverse to 100 full forward.
    ///
    /// # Errors
    ///
    /// As for [`set_servo_direction`](Self::set_servo_direction).
    pub fn set_motor_esc(&self, percent: i32) -> DriverResult<u16> {
        self.translator.set_motor_esc(percent)
    }

    /// Camera pan servo pulse width.
    ///
    /// # Errors
    ///
    /// As for [`set_servo_direction`](Self::set_servo_direction).
    pub fn set_camera_pan(&self, pulse_us: f64) -> DriverResult<u16> {
        self.translator.set_camera_pan(pulse_us)
    }

    /// Camera tilt servo pulse width.
    ///
    /// # Errors
    ///
    /// As for [`set_servo_direction`](Self::set_servo_direction).
    pub fn set_camera_tilt(&self, pulse_us: f64) -> DriverResult<u16> {
        self.translator.set_camera_tilt(pulse_us)
    }

    /// Raw duty ticks for `actuator`, bypassing calibration.
    ///
    /// # Errors
    ///
    /// [`DriverError::TickOutOfRange`](rcdrive_errors::DriverError::TickOutOfRange) above 4095, otherwise as for
    /// [`set_servo_direction`](Self::set_servo_direction).
    pub fn set_raw(&self, actuator: Actuator, duty: u16) -> DriverResult<u16> {
        self.translator.set_raw(actuator, duty)
    }

    /// Raw steering duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_servo_direction_raw(&self, duty: u16) -> DriverResult<u16> {
        self.translator.set_servo_direction_raw(duty)
    }

    /// Raw ESC duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_motor_esc_raw(&self, duty: u16) -> DriverResult<u16> {
        self.translator.set_motor_esc_raw(duty)
    }

    /// Raw camera pan duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_camera_pan_raw(&self, duty: u16) -> DriverResult<u16> {
        self.translator.set_camera_pan_raw(duty)
    }

    /// Raw camera tilt duty.
    ///
    /// # Errors
    ///
    /// As for [`set_raw`](Self::set_raw).
    pub fn set_camera_tilt_raw(&self, duty: u16) -> DriverResult<u16> {
        self.translator.set_camera_tilt_raw(duty)
    }

    /// Start capturing the receiver lines.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::AlreadyActive`] if this vehicle's reader is already
    /// running, otherwise whatever the capture factory reports.
    pub fn init_receiver_readers(&self) -> Result<(), ReceiverError> {
        let mut slot = self.receiver.lock();
        if slot.is_some() {
            return Err(ReceiverError::AlreadyActive {
                chip: self.config.receiver.chip.clone(),
            });
        }

        let mut options = CaptureOptions::new();
        for gpio in self.config.receiver.gpios() {
            options = options.on_pulse(gpio, |gpio, pulse_us| {
                debug!("GPIO {gpio} pulse = {pulse_us} us");
            });
        }

        let capture = self.factory.open(&self.config.receiver, options)?;
        info!(
            backend = %capture.backend(),
            chip = %self.config.receiver.chip,
            "receiver readers started"
        );
        *slot = Some(capture);
        Ok(())
    }

    /// Whether the receiver capture is running.
    pub fn is_receiver_running(&self) -> bool {
        self.receiver
            .lock()
            .as_ref()
            .is_some_and(|capture| capture.is_running())
    }

    /// Capture counters, if the receiver is started.
    pub fn receiver_stats(&self) -> Option<CaptureStats> {
        self.receiver.lock().as_ref().map(|capture| capture.stats())
    }

    /// Read one channel.
    ///
    /// # Errors
    ///
    /// [`ReceiverError::NotInitialized`] before
    /// [`init_receiver_readers`](Self::init_receiver_readers). Signal loss
    /// is [`ChannelReading::NoSignal`], not an error.
    pub fn read_channel(&self, channel: Channel) -> Result<ChannelReading, ReceiverError> {
        let slot = self.receiver.lock();
        let capture = slot.as_deref().ok_or(ReceiverError::NotInitialized)?;
        let reading = self.mapper.read(capture, channel)?;
        if let ChannelReading::NoSignal(reason) = reading {
            debug!(%channel, %reason, "no signal");
        }
        Ok(reading)
    }

    /// Throttle percentage, [`NO_SIGNAL_PERCENT`](crate::NO_SIGNAL_PERCENT)
    /// without signal.
    ///
    /// # Errors
    ///
    /// As for [`read_channel`](Self::read_channel).
    pub fn read_motor_percent(&self) -> Result<i32, ReceiverError> {
        self.read_channel(Channel::Motor).map(ChannelReading::as_percent)
    }

    /// Steering percentage, [`NO_SIGNAL_PERCENT`](crate::NO_SIGNAL_PERCENT)
    /// without signal.
    ///
    /// # Errors
    ///
    /// As for [`read_channel`](Self::read_channel).
    pub fn read_servo_percent(&self) -> Result<i32, ReceiverError> {
        self.read_channel(Channel::Servo).map(ChannelReading::as_percent)
    }

    /// Stop the receiver capture and release the chip. A no-op if not
    /// started.
    ///
    /// # Errors
    ///
    /// Reports a capture that ended abnormally; the chip is released
    /// regardless.
    pub fn shutdown_receiver(&self) -> Result<(), ReceiverError> {
        let Some(mut capture) = self.receiver.lock().take() else {
            return Ok(());
        };
        capture.shutdown()
    }
}

impl Drop for RcVehicle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown_receiver() {
            warn!("receiver shutdown failed: {e}");
        }
    }
}


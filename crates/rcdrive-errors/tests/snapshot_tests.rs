//! Snapshot tests for error message formatting.
//!
//! Log lines and CLI output embed these messages, so they should stay stable.

use rcdrive_errors::prelude::*;

mod bus_error_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_not_initialized() {
        assert_snapshot!(BusError::NotInitialized.to_string(), @"I2C bus not initialized");
    }

    #[test]
    fn test_short_transfer() {
        assert_snapshot!(
            BusError::short_transfer(0xfe, 2, 0).to_string(),
            @"I2C transfer failed at register 0xfe: expected 2 bytes, transferred 0"
        );
    }

    #[test]
    fn test_address_rejected() {
        let err = BusError::AddressRejected {
            address: 0x40,
            reason: "EBUSY".to_string(),
        };
        assert_snapshot!(err.to_string(), @"I2C slave address 0x40 rejected: EBUSY");
    }

    #[test]
    fn test_unavailable() {
        assert_snapshot!(
            BusError::unavailable("/dev/i2c-1", "No such file or directory").to_string(),
            @"I2C device /dev/i2c-1 unavailable: No such file or directory"
        );
    }
}

mod driver_error_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_invalid_channel() {
        assert_snapshot!(
            DriverError::InvalidChannel(16).to_string(),
            @"PWM channel 16 out of range (0-15)"
        );
    }

    #[test]
    fn test_tick_out_of_range() {
        assert_snapshot!(
            DriverError::TickOutOfRange { value: 4096 }.to_string(),
            @"PWM tick value 4096 out of range (0-4095)"
        );
    }
}

mod receiver_error_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_already_active() {
        let err = ReceiverError::AlreadyActive {
            chip: "/dev/gpiochip4".to_string(),
        };
        assert_snapshot!(err.to_string(), @"a pulse reader is already active on /dev/gpiochip4");
    }

    #[test]
    fn test_line_request() {
        let err = ReceiverError::LineRequest {
            reason: "Device or resource busy".to_string(),
        };
        assert_snapshot!(err.to_string(), @"GPIO line request failed: Device or resource busy");
    }

    #[test]
    fn test_not_initialized() {
        assert_snapshot!(ReceiverError::NotInitialized.to_string(), @"pulse reader not initialized");
    }
}

mod wrapped_error_snapshots {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_wrapped_bus_error() {
        let err: RcDriveError = BusError::NotInitialized.into();
        assert_snapshot!(err.to_string(), @"Bus error: I2C bus not initialized");
    }

    #[test]
    fn test_wrapped_driver_bus_error() {
        let err: RcDriveError = DriverError::Bus(BusError::NotInitialized).into();
        assert_snapshot!(err.to_string(), @"Driver error: I2C bus not initialized");
    }

    #[test]
    fn test_wrapped_config_error() {
        let err: RcDriveError = ConfigError::invalid("pwm.frequency_hz", "must be within 24..=1526").into();
        assert_snapshot!(
            err.to_string(),
            @"Configuration error: invalid configuration: pwm.frequency_hz: must be within 24..=1526"
        );
    }
}

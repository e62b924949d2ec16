//! Property-based tests for error formatting.

use proptest::prelude::*;
use rcdrive_errors::prelude::*;

proptest! {
    #[test]
    fn invalid_channel_message_names_channel(channel in 16u8..=u8::MAX) {
        let msg = DriverError::InvalidChannel(channel).to_string();
        prop_assert!(msg.contains(&channel.to_string()));
    }

    #[test]
    fn transfer_message_names_register(register in any::<u8>(), reason in "[a-z ]{1,24}") {
        let err = BusError::transfer(register, reason.clone());
        let msg = err.to_string();
        let hex = format!("{register:#04x}");
        prop_assert!(msg.contains(&hex));
        prop_assert!(msg.contains(&reason));
        prop_assert_eq!(err.register(), Some(register));
    }

    #[test]
    fn driver_wrapping_preserves_bus_severity(context in prop::sample::select(vec!["read", "write", "close"])) {
        let lock: RcDriveError = DriverError::Bus(BusError::Lock { context }).into();
        prop_assert_eq!(lock.severity(), ErrorSeverity::Critical);
        prop_assert!(!lock.is_recoverable());
    }
}

//! Property tests for the pulse state machine.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rcdrive_receiver::table::LineTable;
use rcdrive_receiver::{
    EdgeEvent, FailsafePolicy, LineConfig, LossReason, PulseReading, ReceiverConfig,
};

const GPIO: u32 = 23;
const FRAME_NS: u64 = 20_000_000;

fn table() -> Result<LineTable, TestCaseError> {
    let config = ReceiverConfig::new("prop", vec![LineConfig::new(GPIO)])
        .with_failsafe(FailsafePolicy::default());
    LineTable::new(&config, &BTreeMap::new()).map_err(|e| TestCaseError::fail(e.to_string()))
}

fn feed(table: &mut LineTable, widths: &[u32]) {
    for (frame, width) in widths.iter().enumerate() {
        let rise_ns = frame as u64 * FRAME_NS;
        table.apply(&EdgeEvent::rising(GPIO, rise_ns), 0);
        table.apply(&EdgeEvent::falling(GPIO, rise_ns + u64::from(*width) * 1_000), 0);
    }
}

proptest! {
    #[test]
    fn prop_last_width_is_reported(widths in prop::collection::vec(800u32..2_300, 1..50)) {
        let mut table = table()?;
        feed(&mut table, &widths);

        let reading = table.read(GPIO, 0);
        if let Some(last) = widths.last() {
            prop_assert!(
                reading == PulseReading::Valid(*last)
                    || reading == PulseReading::Lost(LossReason::Failsafe)
            );
        }
    }

    #[test]
    fn prop_failsafe_needs_full_run(run in 0usize..40, tail in 1_600u32..2_000) {
        let mut table = table()?;
        let mut widths = vec![1_530u32; run];
        feed(&mut table, &widths);

        let expected = if run >= 20 {
            PulseReading::Lost(LossReason::Failsafe)
        } else if run == 0 {
            PulseReading::Lost(LossReason::NoPulseYet)
        } else {
            PulseReading::Valid(1_530)
        };
        prop_assert_eq!(table.read(GPIO, 0), expected);

        widths.push(tail);
        let mut fresh = self::table()?;
        feed(&mut fresh, &widths);
        prop_assert_eq!(fresh.read(GPIO, 0), PulseReading::Valid(tail));
    }

    #[test]
    fn prop_unpaired_falls_never_produce_pulses(stamps in prop::collection::vec(0u64..1_000_000_000, 1..30)) {
        let mut table = table()?;
        for stamp in stamps {
            table.apply(&EdgeEvent::falling(GPIO, stamp), 0);
        }
        prop_assert_eq!(table.read(GPIO, 0), PulseReading::Lost(LossReason::NoPulseYet));
    }
}

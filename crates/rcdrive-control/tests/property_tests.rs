//! Property tests for channel mapping and actuator curves.

use proptest::prelude::*;
use rcdrive_control::{CalibrationRange, EscCurve, ReceiverProfile, SteeringCurve};

fn profile_range() -> impl Strategy<Value = CalibrationRange> {
    prop_oneof![
        Just(ReceiverProfile::Standard.motor()),
        Just(ReceiverProfile::Standard.servo()),
        Just(ReceiverProfile::Patator.motor()),
        Just(ReceiverProfile::Patator.servo()),
        (500u32..1_500, 100u32..1_500).prop_map(|(min, span)| CalibrationRange::new(min, min + span)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_percent_is_monotonic(range in profile_range(), a in 0u32..3_000, b in 0u32..3_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(range.percent(lo) <= range.percent(hi));
    }

    #[test]
    fn prop_percent_saturates_outside_range(range in profile_range(), excess in 0u32..1_000) {
        prop_assert_eq!(range.percent(range.max_us + excess), 100);
        prop_assert_eq!(range.percent(range.min_us.saturating_sub(excess)), -100);
    }

    #[test]
    fn prop_percent_stays_in_bounds(range in profile_range(), width in any::<u32>()) {
        let p = range.percent(width);
        prop_assert!((-100..=100).contains(&p));
    }

    #[test]
    fn prop_esc_zero_is_neutral(min in 0u16..1_000, below in 1u16..1_000, above in 1u16..1_000) {
        let curve = EscCurve {
            channel: 1,
            min_duty: min,
            neutral_duty: min + below,
            max_duty: min + below + above,
        };
        prop_assert_eq!(curve.duty_for(0), curve.neutral_duty);
    }

    #[test]
    fn prop_esc_is_monotonic_across_zero(a in -150i32..150, b in -150i32..150) {
        let curve = EscCurve::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(curve.duty_for(lo) <= curve.duty_for(hi));
        prop_assert!((curve.min_duty..=curve.max_duty).contains(&curve.duty_for(a)));
    }

    #[test]
    fn prop_steering_stays_in_range(percent in any::<i32>()) {
        let curve = SteeringCurve::default();
        let duty = curve.duty_for(percent);
        prop_assert!((curve.min_duty..=curve.max_duty).contains(&duty));
    }
}

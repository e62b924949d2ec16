//! Edge-event reader driven by scripted sources.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rcdrive_receiver::{
    CaptureFactory, CaptureOptions, EdgeEvent, EdgeEventReader, LineConfig, LossReason, ManualClock,
    PulseCapture, PulseReading, ReceiverClaim, ReceiverConfig, ReceiverError,
};
use rcdrive_test_helpers::prelude::*;

const MOTOR: u32 = 24;
const SERVO: u32 = 23;

fn config(chip: &str) -> ReceiverConfig {
    ReceiverConfig::new(chip, vec![LineConfig::new(MOTOR), LineConfig::new(SERVO)])
        .with_event_timeout(Duration::from_millis(5))
}

fn start(
    chip: &str,
    clock: &ManualClock,
) -> Result<(EdgeFeed, EdgeEventReader), ReceiverError> {
    let (feed, source) = scripted_edges();
    let options = CaptureOptions::new().with_clock(clock.clone());
    let reader = EdgeEventReader::start(&config(chip), options, source)?;
    Ok((feed, reader))
}

fn wait_for_pulses(reader: &EdgeEventReader, pulses: u64) -> bool {
    wait_until_default(|| reader.stats().pulses >= pulses)
}

#[test]
fn failsafe_run_then_recovery_on_servo_line() -> TestResult {
    let clock = ManualClock::new(5_000_000);
    let (feed, mut reader) = start("edge-failsafe", &clock)?;

    let train = PulseTrain::new(SERVO).repeat(1_530, 20);
    assert!(feed.send_all(train.events()));
    assert!(wait_for_pulses(&reader, 20));
    assert_eq!(
        reader.read_pulse(SERVO)?,
        PulseReading::Lost(LossReason::Failsafe)
    );

    assert!(feed.pulse(SERVO, train.end_ns(), 1_600));
    assert!(wait_for_pulses(&reader, 21));
    assert_eq!(reader.read_pulse(SERVO)?, PulseReading::Valid(1_600));

    reader.shutdown()?;
    Ok(())
}

#[test]
fn nineteen_failsafe_pulses_still_read_valid() -> TestResult {
    let clock = ManualClock::new(5_000_000);
    let (feed, mut reader) = start("edge-nineteen", &clock)?;

    assert!(feed.send_all(PulseTrain::new(MOTOR).repeat(1_530, 19).events()));
    assert!(wait_for_pulses(&reader, 19));
    assert_eq!(reader.read_pulse(MOTOR)?, PulseReading::Valid(1_530));

    reader.shutdown()?;
    Ok(())
}

#[test]
fn reading_goes_stale_after_watchdog() -> TestResult {
    let clock = ManualClock::new(1_000_000);
    let (feed, mut reader) = start("edge-stale", &clock)?;

    assert_eq!(
        reader.read_pulse(MOTOR)?,
        PulseReading::Lost(LossReason::NoPulseYet)
    );

    assert!(feed.pulse(MOTOR, 1_000_000_000, 1_500));
    assert!(wait_for_pulses(&reader, 1));
    assert_eq!(reader.read_pulse(MOTOR)?, PulseReading::Valid(1_500));

    clock.advance_us(200_000);
    assert_eq!(reader.read_pulse(MOTOR)?, PulseReading::Valid(1_500));
    clock.advance_us(1);
    assert_eq!(reader.read_pulse(MOTOR)?, PulseReading::Lost(LossReason::Stale));

    assert!(feed.pulse(MOTOR, 1_300_000_000, 1_450));
    assert!(wait_for_pulses(&reader, 2));
    assert_eq!(reader.read_pulse(MOTOR)?, PulseReading::Valid(1_450));

    reader.shutdown()?;
    Ok(())
}

#[test]
fn lines_are_measured_independently() -> TestResult {
    let clock = ManualClock::new(0);
    let (feed, mut reader) = start("edge-independent", &clock)?;

    assert!(feed.send_all([
        EdgeEvent::rising(MOTOR, 1_000_000),
        EdgeEvent::rising(SERVO, 1_100_000),
        EdgeEvent::falling(SERVO, 2_300_000),
        EdgeEvent::falling(MOTOR, 2_900_000),
    ]));
    assert!(wait_for_pulses(&reader, 2));
    assert_eq!(reader.read_pulse(MOTOR)?, PulseReading::Valid(1_900));
    assert_eq!(reader.read_pulse(SERVO)?, PulseReading::Valid(1_200));

    reader.shutdown()?;
    Ok(())
}

#[test]
fn unmapped_lines_are_counted_not_stored() -> TestResult {
    let clock = ManualClock::new(0);
    let (feed, mut reader) = start("edge-unmapped", &clock)?;

    assert!(feed.pulse(5, 0, 1_500));
    assert!(wait_until_default(|| reader.stats().unmapped_events >= 2));
    assert_eq!(reader.stats().pulses, 0);
    assert_eq!(reader.read_pulse(5)?, PulseReading::Lost(LossReason::Unmapped));

    reader.shutdown()?;
    Ok(())
}

#[test]
fn callbacks_receive_completed_pulses() -> TestResult {
    let seen: Arc<Mutex<Vec<(u32, u32)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let (feed, source) = scripted_edges();
    let options = CaptureOptions::new()
        .with_clock(ManualClock::new(0))
        .on_pulse(SERVO, move |gpio, us| sink.lock().push((gpio, us)));
    let mut reader = EdgeEventReader::start(&config("edge-callbacks"), options, source)?;

    assert!(feed.send_all(PulseTrain::new(SERVO).pulse(1_400).pulse(1_410).events()));
    assert!(feed.pulse(MOTOR, 5_000_000_000, 1_500));
    assert!(wait_for_pulses(&reader, 3));

    assert_eq!(*seen.lock(), vec![(SERVO, 1_400), (SERVO, 1_410)]);
    reader.shutdown()?;
    Ok(())
}

#[test]
fn source_errors_are_counted_and_capture_continues() -> TestResult {
    let clock = ManualClock::new(0);
    let (feed, mut reader) = start("edge-source-error", &clock)?;

    assert!(feed.fail("EIO"));
    assert!(wait_until_default(|| reader.stats().source_errors >= 1));
    assert!(reader.is_running());

    assert!(feed.pulse(SERVO, 0, 1_520));
    assert!(wait_for_pulses(&reader, 1));
    assert_eq!(reader.read_pulse(SERVO)?, PulseReading::Valid(1_520));

    reader.shutdown()?;
    Ok(())
}

#[test]
fn second_reader_on_same_chip_is_rejected() -> TestResult {
    let clock = ManualClock::new(0);
    let (_feed, mut first) = start("edge-exclusive", &clock)?;

    let (second_feed, source) = scripted_edges();
    let second = EdgeEventReader::start(&config("edge-exclusive"), CaptureOptions::new(), source);
    assert!(matches!(second, Err(ReceiverError::AlreadyActive { .. })));
    assert!(second_feed.is_source_dropped());

    first.shutdown()?;
    let (_feed, mut third) = start("edge-exclusive", &clock)?;
    third.shutdown()?;
    Ok(())
}

#[test]
fn shutdown_releases_source_and_claim() -> TestResult {
    let clock = ManualClock::new(0);
    let (feed, mut reader) = start("edge-shutdown", &clock)?;
    assert!(ReceiverClaim::is_claimed("edge-shutdown"));

    reader.shutdown()?;
    assert!(!reader.is_running());
    assert!(feed.is_source_dropped());
    assert!(!ReceiverClaim::is_claimed("edge-shutdown"));

    // Second shutdown is a no-op
    reader.shutdown()?;
    Ok(())
}

#[test]
fn drop_stops_capture() -> TestResult {
    let clock = ManualClock::new(0);
    let (feed, reader) = start("edge-drop", &clock)?;
    drop(reader);
    assert!(feed.is_source_dropped());
    assert!(!ReceiverClaim::is_claimed("edge-drop"));
    Ok(())
}

#[test]
fn invalid_config_releases_everything() {
    let (feed, source) = scripted_edges();
    let options = CaptureOptions::new().on_pulse(7, |_, _| {});
    let result = EdgeEventReader::start(&config("edge-invalid"), options, source);

    assert!(matches!(result, Err(ReceiverError::InvalidConfig(_))));
    assert!(feed.is_source_dropped());
    assert!(!ReceiverClaim::is_claimed("edge-invalid"));
}

#[test]
fn factory_opens_edge_reader() -> TestResult {
    let factory = ScriptedCaptureFactory::new();
    let config = config("edge-factory");
    let mut capture = factory.open(&config, CaptureOptions::new().with_clock(ManualClock::new(0)))?;

    let feed = must_some(factory.edge_feed(), "edge feed after open");
    assert!(feed.pulse(MOTOR, 0, 1_700));
    assert!(wait_until_default(|| capture.stats().pulses >= 1));
    assert_eq!(capture.read_pulse(MOTOR)?, PulseReading::Valid(1_700));
    assert_eq!(factory.open_count(), 1);

    capture.shutdown()?;
    Ok(())
}

#[test]
fn factory_reports_missing_chip() {
    let factory = ScriptedCaptureFactory::new();
    factory.fail_next_open();
    let result = factory.open(&config("edge-factory-missing"), CaptureOptions::new());
    assert!(matches!(result, Err(ReceiverError::DeviceUnavailable { .. })));
    assert!(!ReceiverClaim::is_claimed("edge-factory-missing"));
}

//! Channel mapper over a running alert reader.

use rcdrive_control::{
    CalibrationConfig, Channel, ChannelMapper, ChannelReading, MapperConfig, NO_SIGNAL_PERCENT,
    ReceiverProfile,
};
use rcdrive_errors::ConfigError;
use rcdrive_receiver::{
    Alert, BackendKind, CaptureFactory, CaptureOptions, LineConfig, LossReason, ManualClock,
    PulseCapture, ReceiverConfig,
};
use rcdrive_test_helpers::prelude::*;

fn open(chip: &str) -> Result<(AlertFeed, Box<dyn PulseCapture>), Box<dyn std::error::Error>> {
    let factory = ScriptedCaptureFactory::new();
    let config = ReceiverConfig::new(chip, vec![LineConfig::new(24), LineConfig::new(23)])
        .with_backend(BackendKind::Alerts);
    let capture = factory.open(&config, CaptureOptions::new().with_clock(ManualClock::new(0)))?;
    let feed = must_some(factory.alert_feed(), "alert feed");
    Ok((feed, capture))
}

#[test]
fn percentages_follow_standard_calibration() -> TestResult {
    let (feed, mut capture) = open("mapper-standard")?;
    let mapper = ChannelMapper::new(&MapperConfig::default())?;

    assert!(feed.pulse(24, 0, 2_120));
    assert!(feed.pulse(23, 0, 985));
    assert_eq!(mapper.read(capture.as_ref(), Channel::Motor)?, ChannelReading::Percent(100));
    assert_eq!(mapper.read_percent(capture.as_ref(), Channel::Servo)?, -100);

    assert!(feed.pulse(24, 20_000_000, 1_537));
    assert_eq!(mapper.read_percent(capture.as_ref(), Channel::Motor)?, 0);

    capture.shutdown()?;
    Ok(())
}

#[test]
fn lost_signal_reads_as_sentinel() -> TestResult {
    let (feed, mut capture) = open("mapper-lost")?;
    let mapper = ChannelMapper::new(&MapperConfig::default())?;

    assert_eq!(
        mapper.read(capture.as_ref(), Channel::Motor)?,
        ChannelReading::NoSignal(LossReason::NoPulseYet)
    );

    assert!(feed.pulse(24, 0, 1_600));
    assert!(feed.fire(24, Alert::WatchdogExpired));
    assert_eq!(
        mapper.read_percent(capture.as_ref(), Channel::Motor)?,
        NO_SIGNAL_PERCENT
    );

    capture.shutdown()?;
    Ok(())
}

#[test]
fn unknown_index_has_no_signal() -> TestResult {
    let (feed, mut capture) = open("mapper-index")?;
    let mapper = ChannelMapper::new(&MapperConfig::default())?;
    assert!(feed.pulse(23, 0, 1_583));

    assert_eq!(mapper.read_index(capture.as_ref(), 1)?, ChannelReading::Percent(0));
    assert_eq!(
        mapper.read_index(capture.as_ref(), 7)?,
        ChannelReading::NoSignal(LossReason::Unmapped)
    );

    capture.shutdown()?;
    Ok(())
}

#[test]
fn patator_profile_changes_ranges() -> TestResult {
    let (feed, mut capture) = open("mapper-patator")?;
    let config = MapperConfig::default()
        .with_calibration(CalibrationConfig::from_profile(ReceiverProfile::Patator));
    let mapper = ChannelMapper::new(&config)?;

    assert!(feed.pulse(24, 0, 2_005));
    assert!(feed.pulse(23, 0, 1_005));
    assert_eq!(mapper.read_percent(capture.as_ref(), Channel::Motor)?, 100);
    assert_eq!(mapper.read_percent(capture.as_ref(), Channel::Servo)?, -100);

    capture.shutdown()?;
    Ok(())
}

#[test]
fn mapper_config_from_yaml() -> Result<(), Box<dyn std::error::Error>> {
    let yaml = r"
motor_gpio: 17
calibration:
  profile: patator
  servo:
    min_us: 1000
    max_us: 2000
";
    let config: MapperConfig = serde_yaml::from_str(yaml)?;
    let mapper = ChannelMapper::new(&config)?;
    assert_eq!(mapper.gpio(Channel::Motor), 17);
    assert_eq!(mapper.gpio(Channel::Servo), 23);
    assert_eq!(mapper.range(Channel::Motor), ReceiverProfile::Patator.motor());
    assert_eq!(mapper.range(Channel::Servo).min_us, 1_000);
    Ok(())
}

#[test]
fn inverted_yaml_range_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let yaml = r"
calibration:
  motor:
    min_us: 2000
    max_us: 1000
";
    let config: MapperConfig = serde_yaml::from_str(yaml)?;
    let result = ChannelMapper::new(&config);
    assert!(matches!(result, Err(ConfigError::Invalid { ref field, .. }) if field == "calibration.motor"));
    Ok(())
}

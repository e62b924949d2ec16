//! rcdrivectl - RC vehicle bench tool
//!
//! Checks configuration, drives individual actuators for calibration and
//! prints live receiver percentages.

#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rcdrive::{Actuator, Channel, RcVehicle, VehicleConfig};
use rcdrive_errors::{BusError, ConfigError, DriverError, ReceiverError};
use rcdrive_tracing::init_logging;

#[derive(Parser, Debug)]
#[command(name = "rcdrivectl")]
#[command(about = "RC vehicle bench tool - actuator calibration and receiver monitoring")]
#[command(version)]
struct Cli {
    /// YAML configuration file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Compute duties without writing them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Steer to a percentage (-100 left, 100 right)
    Steer {
        #[arg(allow_negative_numbers = true)]
        percent: i32,
    },

    /// Drive the ESC at a percentage (-100 reverse, 0 stop, 100 forward)
    Esc {
        #[arg(allow_negative_numbers = true)]
        percent: i32,
    },

    /// Move a camera servo to a pulse width in microseconds
    Camera {
        #[arg(value_enum)]
        axis: CameraAxis,
        pulse_us: f64,
    },

    /// Write raw duty ticks to an actuator, bypassing calibration
    Duty {
        #[arg(value_enum)]
        actuator: ActuatorArg,
        ticks: u16,
    },

    /// Print receiver percentages
    Monitor {
        /// Stop after this many samples
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Delay between samples
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate the configuration
    Check,
    /// Print the effective configuration as YAML
    Dump,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CameraAxis {
    Pan,
    Tilt,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ActuatorArg {
    Steering,
    Esc,
    Pan,
    Tilt,
}

impl From<ActuatorArg> for Actuator {
    fn from(arg: ActuatorArg) -> Self {
        match arg {
            ActuatorArg::Steering => Actuator::Steering,
            ActuatorArg::Esc => Actuator::Esc,
            ActuatorArg::Pan => Actuator::CameraPan,
            ActuatorArg::Tilt => Actuator::CameraTilt,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<ConfigError>().is_some() {
        4
    } else if e.downcast_ref::<DriverError>().is_some() || e.downcast_ref::<BusError>().is_some() {
        2
    } else if e.downcast_ref::<ReceiverError>().is_some() {
        3
    } else {
        1
    }
}

fn load_config(cli: &Cli) -> Result<VehicleConfig> {
    let mut config = match &cli.config {
        Some(path) => VehicleConfig::load(path)?,
        None => VehicleConfig::default(),
    };
    if cli.dry_run {
        config.actuators.dry_run = true;
    }
    match cli.verbose {
        0 => {}
        1 => config.logging.level = "debug".to_string(),
        _ => config.logging.level = "trace".to_string(),
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    if let Commands::Config(cmd) = &cli.command {
        return match cmd {
            ConfigCommands::Check => {
                config.validate()?;
                println!("configuration OK");
                Ok(())
            }
            ConfigCommands::Dump => {
                print!("{}", config.to_yaml_string()?);
                Ok(())
            }
        };
    }

    init_logging(&config.logging).context("failed to initialize logging")?;
    let vehicle = RcVehicle::from_hardware(config)?;

    match &cli.command {
        Commands::Config(_) => Ok(()),
        Commands::Steer { percent } => {
            vehicle.init_driver()?;
            let duty = vehicle.set_servo_direction(*percent)?;
            println!("steering {percent}% -> duty {duty}");
            Ok(())
        }
        Commands::Esc { percent } => {
            vehicle.init_driver()?;
            let duty = vehicle.set_motor_esc(*percent)?;
            println!("esc {percent}% -> duty {duty}");
            Ok(())
        }
        Commands::Camera { axis, pulse_us } => {
            vehicle.init_driver()?;
            let duty = match axis {
                CameraAxis::Pan => vehicle.set_camera_pan(*pulse_us)?,
                CameraAxis::Tilt => vehicle.set_camera_tilt(*pulse_us)?,
            };
            println!("camera {axis:?} {pulse_us} us -> duty {duty}");
            Ok(())
        }
        Commands::Duty { actuator, ticks } => {
            vehicle.init_driver()?;
            let actuator = Actuator::from(*actuator);
            vehicle.set_raw(actuator, *ticks)?;
            println!("{actuator} -> duty {ticks}");
            Ok(())
        }
        Commands::Monitor { count, interval_ms } => monitor(&vehicle, *count, *interval_ms),
    }
}

fn monitor(vehicle: &RcVehicle, count: Option<u64>, interval_ms: u64) -> Result<()> {
    vehicle.init_receiver_readers()?;
    let interval = Duration::from_millis(interval_ms);

    let mut sample = 0u64;
    while count.is_none_or(|n| sample < n) {
        let motor = vehicle.read_channel(Channel::Motor)?.to_string();
        let servo = vehicle.read_channel(Channel::Servo)?.to_string();
        println!("motor {motor:>20}  servo {servo:>20}");
        sample = sample.saturating_add(1);
        thread::sleep(interval);
    }

    if let Some(stats) = vehicle.receiver_stats() {
        println!(
            "{} events, {} pulses, {} unmapped, {} source errors",
            stats.events, stats.pulses, stats.unmapped_events, stats.source_errors
        );
    }
    vehicle.shutdown_receiver()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_negative_percent() -> TestResult {
        let cli = Cli::try_parse_from(["rcdrivectl", "esc", "-50"])?;
        assert!(matches!(cli.command, Commands::Esc { percent: -50 }));
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["rcdrivectl", "steer", "20", "--dry-run", "-vv"])?;
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        Ok(())
    }

    #[test]
    fn parse_duty_command() -> TestResult {
        let cli = Cli::try_parse_from(["rcdrivectl", "duty", "pan", "300"])?;
        match cli.command {
            Commands::Duty { actuator, ticks } => {
                assert_eq!(Actuator::from(actuator), Actuator::CameraPan);
                assert_eq!(ticks, 300);
            }
            other => return Err(format!("unexpected command {other:?}").into()),
        }
        Ok(())
    }

    #[test]
    fn parse_monitor_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["rcdrivectl", "monitor", "-n", "5"])?;
        assert!(matches!(
            cli.command,
            Commands::Monitor {
                count: Some(5),
                interval_ms: 100
            }
        ));
        Ok(())
    }

    #[test]
    fn duty_out_of_u16_is_rejected() {
        assert!(matches!(
            Cli::try_parse_from(["rcdrivectl", "duty", "esc", "70000"]),
            Err(_)
        ));
    }

    #[test]
    fn config_errors_map_to_exit_code_4() {
        let e = anyhow::Error::new(ConfigError::Parse("bad".into()));
        assert_eq!(exit_code(&e), 4);
    }
}

//! Global subscriber installation

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{LineFormat, LogConfig, LoggingError};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` overrides `config.level` when set. The log file is opened in
/// append mode and its parent directory is created if missing.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] for a bad level directive,
/// [`LoggingError::FileOpen`] when the file cannot be opened, and
/// [`LoggingError::AlreadyInitialized`] on a second call.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };

    let file_layer = match &config.file {
        Some(path) => Some(
            fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let console_layer = config.console.then(|| {
        fmt::layer()
            .event_format(LineFormat)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        level = %config.level,
        file = ?config.file,
        console = config.console,
        "logging initialized"
    );
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open_err = |source| LoggingError::FileOpen {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_err)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_err)
}

//! Logging configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::LoggingError;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "logs/rcdrive.log";

/// Where log lines go and how verbose they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `rcdrive_receiver=debug,info`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Append-only log file. `None` disables file output.
    pub file: Option<PathBuf>,
    /// Mirror log lines to stderr.
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            console: true,
        }
    }
}

impl LogConfig {
    /// Configuration that only logs to the console.
    pub fn console_only(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            file: None,
            console: true,
        }
    }

    /// Set the log file.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Check the filter directive parses.
    pub fn validate(&self) -> Result<(), LoggingError> {
        self.filter().map(|_| ())
    }

    pub(crate) fn filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            directive: self.level.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.file, Some(PathBuf::from(DEFAULT_LOG_FILE)));
        assert!(config.console);
        assert!(config.validate().ok().is_some());
    }

    #[test]
    fn test_directive_with_targets_validates() {
        let config = LogConfig::console_only("rcdrive_receiver=debug,warn");
        assert!(config.validate().ok().is_some());
    }

    #[test]
    fn test_bad_directive_rejected() {
        let config = LogConfig::console_only("rcdrive_receiver=loud");
        assert!(matches!(
            config.validate(),
            Err(LoggingError::InvalidFilter { .. })
        ));
    }
}

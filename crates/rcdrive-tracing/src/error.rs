//! Logging setup errors

use std::path::PathBuf;

/// Errors raised while installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level or filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Directive as written in configuration
        directive: String,
        /// Parser message
        reason: String,
    },

    /// The log file or its parent directory could not be created.
    #[error("cannot open log file {}: {source}", .path.display())]
    FileOpen {
        /// Log file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

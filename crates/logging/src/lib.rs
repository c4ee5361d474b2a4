//! TokenDrop Logging
//!
//! Unified logging setup for all TokenDrop applications.
//!
//! ## Usage
//!
//! ```no_run
//! use tokendrop_logging::{init, LogLevel};
//!
//! // Initialize with info level
//! init(LogLevel::Info);
//!
//! // Or from a boolean flag (common CLI pattern)
//! let verbose = true;
//! init(LogLevel::from_verbose(verbose));
//! ```

use tracing_subscriber::EnvFilter;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors (default)
    #[default]
    Info,
    /// Debug messages and above
    Debug,
    /// All messages including trace
    Trace,
}

impl LogLevel {
    /// Create a log level from a verbose flag
    ///
    /// - `false` → `Info`
    /// - `true` → `Debug`
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Self::Debug
        } else {
            Self::Info
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Initialize logging with the specified level
///
/// This sets up tracing-subscriber with a formatted output.
/// Call this once at the start of your application.
///
/// # Panics
///
/// Panics if called more than once (tracing subscriber already set).
/// Use `try_init` if you need to handle this case.
pub fn init(level: LogLevel) {
    try_init(level).expect("Failed to initialize logging");
}

/// Try to initialize logging, returning an error if already initialized
pub fn try_init(level: LogLevel) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| e.to_string())
}

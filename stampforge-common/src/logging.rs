//! Logging initialization
//!
//! Thin configuration layer over `env_logger`. Components log through
//! the `log` macros; binaries and tests pick verbosity here.

use serde::{Deserialize, Serialize};

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level to emit
    pub level: LogLevel,
    /// Whether to write to the console; tests typically disable this
    pub console_logging: bool,
    /// Whether to prefix entries with timestamps
    pub include_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console_logging: true,
            include_timestamps: true,
        }
    }
}

/// Initialize the global logger from a configuration.
///
/// Safe to call more than once; later calls are no-ops because the
/// global logger can only be installed a single time.
pub fn init(config: &LogConfig) -> Result<(), String> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level.into());
    if !config.include_timestamps {
        builder.format_timestamp(None);
    }
    if !config.console_logging {
        builder.is_test(true);
    }
    match builder.try_init() {
        Ok(()) => Ok(()),
        // Already initialized; not an error for callers.
        Err(_) => Ok(()),
    }
}

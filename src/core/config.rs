//! Logger configuration
//!
//! The sink path and the initial threshold are the only settings a caller
//! must care about; the rest have defaults matching a plain console + file
//! setup. Path discovery (project roots, timestamped names) is left to the
//! caller.

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    timestamp::TimestampFormat,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default sink path, relative to the working directory
pub const DEFAULT_LOG_PATH: &str = "logs/application.log";

/// Configuration for a [`Logger`](crate::Logger)
///
/// # Examples
///
/// ```
/// use spectral_logger::{LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::new("logs/app.log")
///     .with_min_level(LogLevel::Debug)
///     .with_console(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Log file, opened in append mode
    pub path: PathBuf,
    /// Initial threshold; entries below it are dropped
    pub min_level: LogLevel,
    /// Mirror every line to stdout
    pub console: bool,
    /// Color console output by level
    pub use_colors: bool,
    /// `None` for an unbounded queue
    pub queue_capacity: Option<usize>,
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            min_level: LogLevel::Info,
            console: true,
            use_colors: true,
            queue_capacity: None,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading logger config", path.display().to_string(), e)
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "log file path is empty"));
        }
        if self.queue_capacity == Some(0) {
            return Err(LoggerError::config(
                "LoggerConfig",
                "queue capacity must be greater than zero",
            ));
        }
        if !self.timestamp_format.is_valid() {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!("invalid timestamp pattern: {:?}", self.timestamp_format),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

//! Log entry structure and the entry formatter

use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Error attached to a log entry: kind, message and an optional backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
    pub backtrace: Option<String>,
}

impl ErrorDetail {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            backtrace: None,
        }
    }

    /// Build from any error value, using its static type name as the kind.
    ///
    /// The name is resolved at compile time, so a trait object such as
    /// `&dyn Error` or `&*Box<dyn Error>` is recorded as `dyn core::error::Error`.
    /// Use [`ErrorDetail::new`] with an explicit kind for boxed errors.
    ///
    /// ```
    /// use spectral_logger::core::ErrorDetail;
    ///
    /// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    /// let detail = ErrorDetail::from_error(&err);
    /// assert!(detail.kind.starts_with("std::io::"));
    /// assert_eq!(detail.message, "disk on fire");
    /// ```
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::new(std::any::type_name::<E>(), err.to_string())
    }

    /// Like [`ErrorDetail::from_error`], plus a backtrace of the calling site
    /// when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` enables capturing.
    pub fn capture<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::from_error(err).with_backtrace(&Backtrace::capture())
    }

    /// Attach a backtrace; ignored unless it was actually captured.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.backtrace = Some(backtrace.to_string());
        }
        self
    }

    #[must_use]
    pub fn with_backtrace_text(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exception: {}: {}", self.kind, self.message)?;
        if let Some(ref backtrace) = self.backtrace {
            for line in backtrace.lines() {
                write!(f, "\n{}", line)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub error: Option<ErrorDetail>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a message can never forge the start of another entry.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Local::now(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: Option<ErrorDetail>) -> Self {
        self.error = error;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Render as `<timestamp> [<LEVEL>] <message>`, followed by the error
    /// block on its own lines when an error is attached.
    pub fn format(&self, timestamp_format: &TimestampFormat) -> FormattedLine {
        let mut text = format!(
            "{} [{}] {}",
            timestamp_format.format(&self.timestamp),
            self.level,
            self.message
        );

        if let Some(ref error) = self.error {
            text.push('\n');
            text.push_str(&error.to_string());
        }

        FormattedLine {
            level: self.level,
            text,
        }
    }
}

/// Format a single entry stamped with the current local time.
pub fn format_entry(
    level: LogLevel,
    message: impl AsRef<str>,
    error: Option<ErrorDetail>,
    timestamp_format: &TimestampFormat,
) -> FormattedLine {
    LogEntry::new(level, message)
        .with_error(error)
        .format(timestamp_format)
}

/// A fully rendered record; the unit transferred through the queue.
///
/// Fields are private so the text cannot change once it has been built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    level: LogLevel,
    text: String,
}

impl FormattedLine {
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Recover the level token from the first line of a formatted record.
    pub fn parse_level(text: &str) -> Option<LogLevel> {
        let first = text.lines().next()?;
        let (_, rest) = first.split_once(" [")?;
        let (token, _) = rest.split_once(']')?;
        token.parse().ok()
    }
}

impl fmt::Display for FormattedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

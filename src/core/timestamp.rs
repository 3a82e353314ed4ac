//! Timestamp formatting utilities
//!
//! Every format here is fixed-width and sorts lexically in time order, so a
//! log file can be sorted or bisected by its leading timestamp.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

const MILLIS_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Timestamp format options for formatted lines
///
/// # Examples
///
/// ```
/// use spectral_logger::core::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Seconds.format(&at), "2025-01-08 10:30:45");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local date and time with milliseconds: `2025-01-08 10:30:45.123`
    #[default]
    Millis,

    /// Local date and time, second resolution: `2025-01-08 10:30:45`
    Seconds,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+00:00`
    Iso8601,

    /// Custom strftime format
    ///
    /// The caller is responsible for picking a sortable pattern. A pattern
    /// chrono cannot render falls back to [`TimestampFormat::Millis`].
    Custom(String),
}

impl TimestampFormat {
    fn pattern(&self) -> &str {
        match self {
            TimestampFormat::Millis => MILLIS_PATTERN,
            TimestampFormat::Seconds => "%Y-%m-%d %H:%M:%S",
            TimestampFormat::Iso8601 => "%Y-%m-%dT%H:%M:%S%.3f%:z",
            TimestampFormat::Custom(format_str) => format_str,
        }
    }

    /// Whether every specifier in the pattern is one chrono understands.
    pub fn is_valid(&self) -> bool {
        !StrftimeItems::new(self.pattern()).any(|item| matches!(item, Item::Error))
    }

    /// Format a datetime according to this format
    ///
    /// Never fails: a pattern chrono rejects is rendered with the
    /// millisecond pattern instead.
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::new();
        if write!(out, "{}", datetime.format(self.pattern())).is_err() {
            out.clear();
            // The fixed pattern is known to be valid.
            let _ = write!(out, "{}", datetime.format(MILLIS_PATTERN));
        }
        out
    }
}

//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod queue;
pub mod timestamp;
pub mod worker;

pub use appender::Appender;
pub use config::{LoggerConfig, DEFAULT_LOG_PATH};
pub use error::{LoggerError, Result};
pub use log_entry::{format_entry, ErrorDetail, FormattedLine, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use queue::{LineQueue, LineReceiver};
pub use timestamp::TimestampFormat;
pub use worker::WorkerState;

//! # Spectral Logger
//!
//! A process-wide asynchronous logger. Callers format and enqueue entries
//! from any thread or task; one background worker writes them, in order, to
//! a colored console and an append-only log file.
//!
//! ## Features
//!
//! - **Non-blocking producers**: `log` never waits on I/O, `log_async` only
//!   waits for queue acceptance
//! - **Ordered delivery**: one consumer, strict FIFO from submission to file
//! - **Durable writes**: every line is flushed as it is written, and a failed
//!   write is retried once after reopening the file
//! - **Explicit lifecycle**: `flush` drains everything submitted so far,
//!   `dispose` stops immediately
//!
//! ```no_run
//! use spectral_logger::prelude::*;
//!
//! # async fn example() -> spectral_logger::Result<()> {
//! Logger::configure(LoggerConfig::new("logs/application.log"))?;
//! let logger = Logger::instance();
//! logger.set_level(LogLevel::Debug);
//!
//! spectral_logger::info!(logger, "Application started on port {}", 8080);
//! logger.log_async(LogLevel::Warning, "Memory is high", None).await;
//!
//! logger.flush().await?;
//! logger.dispose();
//! # Ok(())
//! # }
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::core::{
        Appender, ErrorDetail, FormattedLine, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Result, TimestampFormat, WorkerState,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

pub use appenders::{ConsoleAppender, FileAppender};
pub use core::{
    format_entry, Appender, ErrorDetail, FormattedLine, LogEntry, LogLevel, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Result, TimestampFormat,
    WorkerState, DEFAULT_SHUTDOWN_TIMEOUT,
};

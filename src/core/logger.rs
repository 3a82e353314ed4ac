//! Logger facade and process-wide instance

use super::{
    appender::Appender,
    config::LoggerConfig,
    error::{LoggerError, Result},
    log_entry::{format_entry, ErrorDetail},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    queue::LineQueue,
    timestamp::TimestampFormat,
    worker::{self, SinkSource, WorkerState},
};
use crate::appenders::ConsoleAppender;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Default timeout for [`Logger::shutdown`] callers that have no better bound
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();
static GLOBAL_CONFIG: OnceCell<LoggerConfig> = OnceCell::new();

/// Asynchronous logger facade
///
/// Producers format and enqueue; a dedicated worker thread writes every
/// line to the console and the log file in submission order. Any number of
/// threads or tasks may log through a shared reference.
///
/// Lifecycle: construct once, optionally [`flush`](Logger::flush) once near
/// shutdown, then [`dispose`](Logger::dispose) (also run on drop). After
/// either, every submission is rejected.
///
/// # Example
///
/// ```no_run
/// use spectral_logger::prelude::*;
///
/// # async fn example() -> spectral_logger::Result<()> {
/// let logger = Logger::new(LoggerConfig::new("logs/app.log"))?;
/// logger.info("Application started");
/// logger.log_async(LogLevel::Warning, "Memory is high", None).await;
/// logger.flush().await?;
/// # Ok(())
/// # }
/// ```
pub struct Logger {
    min_level: RwLock<LogLevel>,
    queue: LineQueue,
    timestamp_format: TimestampFormat,
    state: watch::Receiver<WorkerState>,
    cancel: CancellationToken,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
    path: Option<PathBuf>,
}

impl Logger {
    /// Create an isolated logger writing to `config.path`.
    ///
    /// Fails if the sink cannot be created, even after the manual-creation
    /// fallback; such a logger would be unusable.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Process-wide logger, created on first use.
    ///
    /// Concurrent first callers all receive the same instance; only one
    /// worker and one sink are ever created. The configuration comes from
    /// [`Logger::configure`] if it was called, otherwise the default.
    ///
    /// # Panics
    ///
    /// Panics if the logger cannot be initialized. A logger that cannot log
    /// is a configuration error the operator has to see; use
    /// [`Logger::install`] to handle the failure instead.
    pub fn instance() -> &'static Logger {
        GLOBAL_LOGGER.get_or_init(|| {
            let config = GLOBAL_CONFIG.get().cloned().unwrap_or_default();
            match Logger::new(config) {
                Ok(logger) => logger,
                Err(e) => panic!("[LOGGER CRITICAL] Failed to initialize global logger: {}", e),
            }
        })
    }

    /// The process-wide logger, if it has been created.
    pub fn get() -> Option<&'static Logger> {
        GLOBAL_LOGGER.get()
    }

    /// Set the configuration [`Logger::instance`] will use.
    ///
    /// Only valid before the instance exists and only once.
    pub fn configure(config: LoggerConfig) -> Result<()> {
        config.validate()?;
        if GLOBAL_LOGGER.get().is_some() {
            return Err(LoggerError::config(
                "Logger",
                "global logger is already initialized",
            ));
        }
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| LoggerError::config("Logger", "global logger is already configured"))
    }

    /// Eagerly create the process-wide logger from `config`.
    ///
    /// Initialization errors are returned rather than panicking. Fails if
    /// the instance already exists.
    pub fn install(config: LoggerConfig) -> Result<&'static Logger> {
        let mut created = false;
        let logger = GLOBAL_LOGGER.get_or_try_init(|| {
            created = true;
            Logger::new(config)
        })?;

        if created {
            Ok(logger)
        } else {
            Err(LoggerError::config(
                "Logger",
                "global logger is already initialized",
            ))
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        let mut min_level = self.min_level.write();
        *min_level = level;
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    /// Submit an entry without blocking.
    ///
    /// Returns `true` if the entry was queued and `false` if it was filtered
    /// or refused. Entries below the threshold are discarded before
    /// formatting. Entries the queue refuses are dropped and counted in
    /// [`LoggerMetrics::rejected_count`]; stderr gets a warning for the first
    /// rejection and every 1000th after it.
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>, error: Option<ErrorDetail>) -> bool {
        if !self.is_enabled(level) {
            return false;
        }

        let line = format_entry(level, message, error, &self.timestamp_format);
        match self.queue.enqueue(line) {
            Ok(()) => true,
            Err(e) => {
                self.report_rejection(&e);
                false
            }
        }
    }

    /// Submit an entry, suspending only until the queue accepts it.
    ///
    /// The file write happens later on the worker; this never waits for it.
    pub async fn log_async(
        &self,
        level: LogLevel,
        message: impl AsRef<str>,
        error: Option<ErrorDetail>,
    ) -> bool {
        if !self.is_enabled(level) {
            return false;
        }

        let line = format_entry(level, message, error, &self.timestamp_format);
        match self.queue.enqueue_async(line).await {
            Ok(()) => true,
            Err(e) => {
                self.report_rejection(&e);
                false
            }
        }
    }

    /// Log at `Error` with `err` attached, capturing a backtrace when enabled.
    ///
    /// The kind comes from the static type of `err`; a boxed or `dyn Error`
    /// value shows up as `dyn core::error::Error`. Pass an
    /// [`ErrorDetail::new`] to [`Logger::log`] to name the kind yourself.
    pub fn log_error<E>(&self, message: impl AsRef<str>, err: &E) -> bool
    where
        E: std::error::Error + ?Sized,
    {
        self.log(LogLevel::Error, message, Some(ErrorDetail::capture(err)))
    }

    fn report_rejection(&self, err: &LoggerError) {
        let rejected = self.metrics.record_rejected();

        // Alert on the first rejection and periodically thereafter
        if rejected == 0 || (rejected + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Could not queue log entry ({}); {} entries rejected so far",
                err,
                rejected + 1
            );
        }
    }

    /// Close the queue and wait until every entry submitted so far is
    /// written and the sink flushed.
    ///
    /// Meant to be called once near shutdown: the logger accepts nothing
    /// afterwards, and later calls return as soon as the worker is stopped.
    /// No timeout is applied here; wrap the future in one if needed.
    pub async fn flush(&self) -> Result<()> {
        self.queue.close();

        let mut state = self.state.clone();
        let waited = state.wait_for(|s| *s == WorkerState::Stopped).await;
        match waited {
            Ok(_) => Ok(()),
            Err(_) => Err(LoggerError::other(
                "log worker exited before draining the queue",
            )),
        }
    }

    /// Blocking counterpart of [`Logger::flush`] with an upper bound.
    ///
    /// Closes the queue and waits up to `timeout` for the worker thread to
    /// finish draining. Returns `true` if it finished in time.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.queue.close();

        let Some(handle) = self.worker.lock().take() else {
            return self.state() == WorkerState::Stopped;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Log worker thread panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Log worker did not finish within {:?}. Some logs may be lost.",
                    timeout
                );
                // Keep the handle so dispose can still cancel and join.
                *self.worker.lock() = Some(handle);
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Stop the worker without draining, then release the sink.
    ///
    /// Queued entries may be abandoned. Safe to call more than once.
    pub fn dispose(&self) {
        self.cancel.cancel();
        self.queue.close();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Log worker thread panicked: {:?}", e);
            }
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Sink path, or `None` when a custom sink was supplied
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message, None);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message, None);
    }

    #[inline]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message, None);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message, None);
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.dispose();

        let rejected = self.metrics.rejected_count();
        let dropped = self.metrics.dropped_count();
        if dropped + rejected > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped and {} rejected logs (drop rate: {:.2}%)",
                dropped,
                rejected,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use spectral_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .path("logs/app.log")
///     .min_level(LogLevel::Debug)
///     .console(false)
///     .build()
///     .expect("log file should be writable");
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    sink: Option<Box<dyn Appender>>,
    console: Option<Box<dyn Appender>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            sink: None,
            console: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    /// Mirror lines to stdout
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.config.use_colors = use_colors;
        self
    }

    /// Bound the queue; `log_async` then waits for room when it is full.
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// Replace the file sink with a custom appender; `path` is then unused.
    #[must_use = "builder methods return a new value"]
    pub fn sink<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.sink = Some(Box::new(appender));
        self
    }

    /// Replace the stdout renderer with a custom appender.
    #[must_use = "builder methods return a new value"]
    pub fn console_appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.console = Some(Box::new(appender));
        self.config.console = true;
        self
    }

    /// Start the worker and build the Logger
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            sink,
            console,
        } = self;
        config.validate()?;

        let console = if config.console {
            Some(console.unwrap_or_else(|| {
                Box::new(ConsoleAppender::with_colors(config.use_colors)) as Box<dyn Appender>
            }))
        } else {
            None
        };

        let (sink, path) = match sink {
            Some(appender) => (SinkSource::Appender(appender), None),
            None => (SinkSource::Path(config.path.clone()), Some(config.path.clone())),
        };

        let (queue, receiver) = LineQueue::with_capacity(config.queue_capacity);
        let metrics = Arc::new(LoggerMetrics::new());
        let handle = worker::spawn(sink, console, receiver, Arc::clone(&metrics))?;

        Ok(Logger {
            min_level: RwLock::new(config.min_level),
            queue,
            timestamp_format: config.timestamp_format,
            state: handle.state,
            cancel: handle.cancel,
            worker: Mutex::new(Some(handle.thread)),
            metrics,
            path,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn quiet_logger(dir: &TempDir) -> Logger {
        Logger::builder()
            .path(dir.path().join("unit.log"))
            .console(false)
            .build()
            .expect("Failed to create logger")
    }

    #[test]
    fn test_builder_defaults() {
        let builder = LoggerBuilder::default();
        assert_eq!(builder.config, LoggerConfig::default());
    }

    #[test]
    fn test_new_logger_is_running() {
        let dir = TempDir::new().unwrap();
        let logger = quiet_logger(&dir);

        assert_eq!(logger.state(), WorkerState::Running);
        assert_eq!(logger.level(), LogLevel::Info);
        assert_eq!(logger.path(), Some(dir.path().join("unit.log").as_path()));
    }

    #[test]
    fn test_set_level_filters_before_queueing() {
        let dir = TempDir::new().unwrap();
        let logger = quiet_logger(&dir);

        logger.set_level(LogLevel::Warning);
        assert!(!logger.log(LogLevel::Debug, "dropped", None));
        assert!(!logger.log(LogLevel::Info, "dropped", None));
        assert!(logger.log(LogLevel::Warning, "kept", None));
        assert!(logger.log(LogLevel::Error, "kept", None));
        assert_eq!(logger.metrics().rejected_count(), 0);
    }

    #[test]
    fn test_flush_then_log_is_rejected() {
        let dir = TempDir::new().unwrap();
        let logger = quiet_logger(&dir);

        logger.info("before flush");
        tokio_test::block_on(logger.flush()).expect("flush failed");
        assert_eq!(logger.state(), WorkerState::Stopped);

        assert!(!logger.log(LogLevel::Error, "after flush", None));
        assert_eq!(logger.metrics().rejected_count(), 1);

        // A second flush returns immediately.
        tokio_test::block_on(logger.flush()).expect("second flush failed");
    }

    #[test]
    fn test_every_rejection_is_counted() {
        let dir = TempDir::new().unwrap();
        let logger = quiet_logger(&dir);
        logger.dispose();

        for i in 0..1500 {
            assert!(!logger.log(LogLevel::Info, format!("late {}", i), None));
        }
        assert_eq!(logger.metrics().rejected_count(), 1500);
        assert_eq!(logger.dropped_count(), 0);
    }

    #[test]
    fn test_shutdown_drains() {
        let dir = TempDir::new().unwrap();
        let logger = quiet_logger(&dir);

        for i in 0..10 {
            logger.info(format!("Message {}", i));
        }
        assert!(logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));
        assert_eq!(logger.state(), WorkerState::Stopped);

        let content = std::fs::read_to_string(dir.path().join("unit.log")).unwrap();
        assert_eq!(content.lines().count(), 10);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let logger = quiet_logger(&dir);

        logger.dispose();
        logger.dispose();
        assert_eq!(logger.state(), WorkerState::Stopped);
        assert!(!logger.log(LogLevel::Error, "after dispose", None));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Logger::builder().path("").build();
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }
}

//! Appender trait for log output destinations

use super::{error::Result, log_entry::FormattedLine};
use async_trait::async_trait;

/// Destination driven by the worker loop.
///
/// Appenders are moved into the worker thread and only ever touched from
/// there, so implementations need `Send` but no internal locking.
///
/// # Example
///
/// ```no_run
/// use spectral_logger::core::{Appender, FormattedLine, Result};
/// use async_trait::async_trait;
///
/// struct CollectingAppender(Vec<String>);
///
/// #[async_trait]
/// impl Appender for CollectingAppender {
///     async fn append(&mut self, line: &FormattedLine) -> Result<()> {
///         self.0.push(line.to_string());
///         Ok(())
///     }
///
///     async fn flush(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "collecting"
///     }
/// }
/// ```
#[async_trait]
pub trait Appender: Send {
    /// Write one formatted line
    async fn append(&mut self, line: &FormattedLine) -> Result<()>;

    /// Flush anything buffered
    async fn flush(&mut self) -> Result<()>;

    /// Close and reopen the destination after a failed append.
    ///
    /// Destinations without a handle to refresh keep the default no-op.
    async fn reopen(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

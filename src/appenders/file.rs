//! File appender implementation
//!
//! Append-only sink for one path. Every line is flushed as soon as it is
//! written, so a crash loses at most the line in flight.

use crate::core::{Appender, FormattedLine, LoggerError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Written by the manual-creation fallback when the regular open fails
const FALLBACK_HEADER: &str = "=== Log file start ===\n";

pub struct FileAppender {
    path: PathBuf,
    file: Option<File>,
}

impl FileAppender {
    /// Open (creating if needed) the log file at `path` in append mode.
    ///
    /// A missing parent directory is created first. If the open itself
    /// fails, one manual-creation attempt is made before giving up with
    /// [`LoggerError::InitializationFailed`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use spectral_logger::appenders::FileAppender;
    ///
    /// # async fn example() -> spectral_logger::Result<()> {
    /// let appender = FileAppender::open("logs/application.log").await?;
    /// assert!(appender.path().ends_with("application.log"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        Self::ensure_parent(&path).await?;

        let file = match Self::open_append(&path).await {
            Ok(file) => file,
            Err(open_err) => {
                eprintln!(
                    "[LOGGER WARNING] Could not open log file '{}': {}. Trying to create it manually",
                    path.display(),
                    open_err
                );
                Self::create_manually(&path, &open_err).await?;
                Self::open_append(&path).await.map_err(|e| {
                    LoggerError::initialization(path.display().to_string(), e.to_string())
                })?
            }
        };

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    LoggerError::io_operation(
                        "creating log directory",
                        parent.display().to_string(),
                        e,
                    )
                })
            }
            _ => Ok(()),
        }
    }

    async fn open_append(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path).await
    }

    async fn create_manually(path: &Path, open_err: &std::io::Error) -> Result<()> {
        tokio::fs::write(path, FALLBACK_HEADER).await.map_err(|e| {
            LoggerError::initialization(
                path.display().to_string(),
                format!("{}; manual creation failed: {}", open_err, e),
            )
        })
    }
}

#[async_trait]
impl Appender for FileAppender {
    async fn append(&mut self, line: &FormattedLine) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        let mut output = String::with_capacity(line.as_str().len() + 1);
        output.push_str(line.as_str());
        output.push('\n');

        file.write_all(output.as_bytes()).await.map_err(|e| {
            LoggerError::io_operation("writing log file", self.path.display().to_string(), e)
        })?;
        file.flush().await.map_err(|e| {
            LoggerError::io_operation("flushing log file", self.path.display().to_string(), e)
        })?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush().await?;
        }
        Ok(())
    }

    async fn reopen(&mut self) -> Result<()> {
        // Release the old handle before opening a new one.
        if let Some(mut old) = self.file.take() {
            let _ = old.flush().await;
        }

        Self::ensure_parent(&self.path).await?;
        let file = Self::open_append(&self.path).await.map_err(|e| {
            LoggerError::file_appender(self.path.display().to_string(), e.to_string())
        })?;
        self.file = Some(file);
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

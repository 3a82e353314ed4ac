//! Console appender implementation

use crate::core::{Appender, FormattedLine, LogLevel, Result};
use async_trait::async_trait;
use colored::{ColoredString, Colorize};
use std::io::Write;

pub struct ConsoleAppender {
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    /// Text as it will appear on the terminal
    pub fn render(&self, line: &FormattedLine) -> String {
        if self.use_colors {
            paint(line.level(), line.as_str()).to_string()
        } else {
            line.as_str().to_string()
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

/// Debug is dimmed, Info plain, Warning highlighted, Error alerting.
fn paint(level: LogLevel, text: &str) -> ColoredString {
    match level {
        LogLevel::Debug => text.dimmed(),
        LogLevel::Info => text.normal(),
        LogLevel::Warning => text.yellow().bold(),
        LogLevel::Error => text.red().bold(),
    }
}

// Kept out of the async fn so the stdout lock never lives in a future.
fn write_stdout(text: &str) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", text)
}

#[async_trait]
impl Appender for ConsoleAppender {
    async fn append(&mut self, line: &FormattedLine) -> Result<()> {
        write_stdout(&self.render(line))?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

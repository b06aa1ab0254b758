//! Console appender implementation

use crate::core::{Appender, LogLevel, LogRecord, OutputFormat, Result, TimestampFormat};
use std::io::{self, Write};

/// Writes records to the standard streams
///
/// Error records go to stderr, everything else to stdout.
pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Set the output format for this appender
    ///
    /// ```
    /// use ctxlog::appenders::ConsoleAppender;
    /// use ctxlog::OutputFormat;
    ///
    /// let appender = ConsoleAppender::new().with_output_format(OutputFormat::Text);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom strftime-compatible timestamp layout
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let colors = self.use_colors && self.output_format == OutputFormat::Text;
        let output = self
            .output_format
            .format(record, &self.timestamp_format, colors);

        match record.level {
            LogLevel::Error => writeln!(io::stderr().lock(), "{}", output)?,
            _ => writeln!(io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_appender_writes_and_flushes() {
        let mut appender = ConsoleAppender::with_colors(false).with_output_format(OutputFormat::Text);
        let record = LogRecord::new(LogLevel::Info, "console smoke test");

        assert!(appender.append(&record).is_ok());
        assert!(appender.flush().is_ok());
        assert_eq!(appender.name(), "console");
    }
}

//! In-memory appender for tests

use crate::core::{Appender, LogRecord, OutputFormat, Result, TimestampFormat};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    lines: Vec<String>,
    records: Vec<LogRecord>,
}

/// Shared buffer collecting everything a logger writes
///
/// Clones share the same storage, so a test keeps one clone and hands the
/// other to the logger.
///
/// ```
/// use ctxlog::{test_context, info};
///
/// let (ctx, buffer) = test_context(None);
/// info(&ctx, "hello", &[]);
/// assert!(buffer.contents().contains("hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Captured>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String, record: &LogRecord) {
        let mut captured = self.inner.lock();
        captured.lines.push(line);
        captured.records.push(record.clone());
    }

    /// Formatted lines in write order
    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines.clone()
    }

    /// All lines, each terminated by a newline
    pub fn contents(&self) -> String {
        let captured = self.inner.lock();
        let mut out = String::new();
        for line in &captured.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// The records as handed to the appender
    pub fn records(&self) -> Vec<LogRecord> {
        self.inner.lock().records.clone()
    }

    /// Lines parsed as JSON, skipping any that are not
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.inner
            .lock()
            .lines
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lines.is_empty()
    }

    pub fn clear(&self) {
        let mut captured = self.inner.lock();
        captured.lines.clear();
        captured.records.clear();
    }
}

/// Appender writing into a [`CaptureBuffer`], never colored
pub struct CaptureAppender {
    buffer: CaptureBuffer,
    output_format: OutputFormat,
    timestamp_format: TimestampFormat,
}

impl CaptureAppender {
    pub fn new(buffer: CaptureBuffer) -> Self {
        Self {
            buffer,
            output_format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
        }
    }

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
}

impl Appender for CaptureAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = self
            .output_format
            .format(record, &self.timestamp_format, false);
        self.buffer.push(line, record);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "capture"
    }
}

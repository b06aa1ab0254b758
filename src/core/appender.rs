//! Appender trait for record destinations

use super::{error::Result, log_record::LogRecord};

/// A destination for finished records
///
/// Appenders are owned by the backend and called under its lock, one
/// record at a time, so implementations need no internal synchronization.
pub trait Appender: Send + Sync {
    fn append(&mut self, record: &LogRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

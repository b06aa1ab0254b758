//! Log record structure

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Tracing context for distributed tracing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingContext {
    /// Trace ID for request correlation
    pub trace_id: String,

    /// Span ID for this operation
    pub span_id: String,

    /// Parent span ID (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
}

impl TracingContext {
    pub fn new(trace_id: String, span_id: String) -> Self {
        Self {
            trace_id,
            span_id,
            parent_span_id: None,
        }
    }

    pub fn with_parent(mut self, parent_span_id: String) -> Self {
        self.parent_span_id = Some(parent_span_id);
        self
    }
}

/// One finished record, as handed to appenders
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Logger name configured on the handle, empty when unnamed
    pub logger_name: String,
    /// Trimmed call site, `dir/file.rs:line`
    pub source: Option<String>,
    /// Nested attributes in insertion order
    pub fields: Vec<Field>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub stacktrace: Option<String>,
    pub trace: Option<TracingContext>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Utc::now(),
            logger_name: String::new(),
            source: None,
            fields: Vec::new(),
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            stacktrace: None,
            trace: None,
        }
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: String) -> Self {
        self.stacktrace = Some(stacktrace);
        self
    }

    pub fn with_trace(mut self, trace: TracingContext) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Look up a top-level field by key
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let record = LogRecord::new(LogLevel::Info, "line one\nERROR fake\tentry");
        assert_eq!(record.message, "line one\\nERROR fake\\tentry");
    }

    #[test]
    fn test_builder_methods() {
        let record = LogRecord::new(LogLevel::Warn, "slow query")
            .with_logger_name("db")
            .with_source(Some("store/query.rs:10".into()))
            .with_fields(vec![Field::new("ms", 1200)]);

        assert_eq!(record.logger_name, "db");
        assert_eq!(record.source.as_deref(), Some("store/query.rs:10"));
        assert!(record.field("ms").is_some());
        assert!(record.field("missing").is_none());
        assert!(!record.thread_id.is_empty());
    }
}

//! Output format configuration for log records
//!
//! - Text: tab-separated, human readable, optionally colored (development)
//! - Json: one compact JSON object per line (production)

use super::field::{fields_to_json, Field, FieldValue};
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable text format
    ///
    /// Example: `2025-01-08T10:30:45.123Z	INFO	api	app/main.rs:12	request done	status=200`
    Text,

    /// JSON format for machine processing (default)
    ///
    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","message":"request done"}`
    #[default]
    Json,
}

impl OutputFormat {
    /// Format a record. `colors` only affects the text level column.
    pub fn format(&self, record: &LogRecord, timestamp_format: &TimestampFormat, colors: bool) -> String {
        match self {
            OutputFormat::Text => format_text(record, timestamp_format, colors),
            OutputFormat::Json => format_json(record, timestamp_format),
        }
    }
}

fn level_column(record: &LogRecord, colors: bool) -> String {
    #[cfg(feature = "console")]
    if colors {
        use colored::Colorize;
        return record
            .level
            .to_str()
            .color(record.level.color_code())
            .to_string();
    }
    #[cfg(not(feature = "console"))]
    let _ = colors;

    record.level.to_str().to_string()
}

fn format_text(record: &LogRecord, timestamp_format: &TimestampFormat, colors: bool) -> String {
    let mut columns = vec![
        timestamp_format.format(&record.timestamp),
        level_column(record, colors),
    ];
    if !record.logger_name.is_empty() {
        columns.push(record.logger_name.clone());
    }
    if let Some(ref source) = record.source {
        columns.push(source.clone());
    }
    columns.push(record.message.clone());

    let mut pairs = Vec::new();
    if let Some(ref trace) = record.trace {
        pairs.push(format!("trace_id={}", trace.trace_id));
        pairs.push(format!("span_id={}", trace.span_id));
    }
    flatten_text(&record.fields, "", &mut pairs);
    if !pairs.is_empty() {
        columns.push(pairs.join(" "));
    }

    let mut line = columns.join("\t");
    if let Some(ref stacktrace) = record.stacktrace {
        line.push('\n');
        line.push_str(stacktrace);
    }
    line
}

/// Render fields as `key=value`, with group keys joined by dots
fn flatten_text(fields: &[Field], prefix: &str, out: &mut Vec<String>) {
    for field in fields {
        let key = if prefix.is_empty() {
            field.key.clone()
        } else {
            format!("{}.{}", prefix, field.key)
        };
        match &field.value {
            FieldValue::Group(inner) => flatten_text(inner, &key, out),
            FieldValue::String(s) => out.push(format!("{}={}", key, quote_text_value(s))),
            other => out.push(format!("{}={}", key, other)),
        }
    }
}

fn quote_text_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Built-in keys are written over the user fields, so a field named `level`
/// or `message` never replaces the record's own value.
fn format_json(record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
    let mut json_obj = fields_to_json(&record.fields);

    json_obj.insert(
        "timestamp".to_string(),
        timestamp_format.to_json_value(&record.timestamp),
    );
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(record.level.to_str().to_string()),
    );
    if !record.logger_name.is_empty() {
        json_obj.insert(
            "logger".to_string(),
            serde_json::Value::String(record.logger_name.clone()),
        );
    }
    if let Some(ref source) = record.source {
        json_obj.insert("source".to_string(), serde_json::Value::String(source.clone()));
    }
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(record.message.clone()),
    );
    if let Some(ref trace) = record.trace {
        json_obj.insert(
            "trace_id".to_string(),
            serde_json::Value::String(trace.trace_id.clone()),
        );
        json_obj.insert(
            "span_id".to_string(),
            serde_json::Value::String(trace.span_id.clone()),
        );
    }

    if let Some(ref stacktrace) = record.stacktrace {
        json_obj.insert(
            "stacktrace".to_string(),
            serde_json::Value::String(stacktrace.clone()),
        );
    }

    serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
}

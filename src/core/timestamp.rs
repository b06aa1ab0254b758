//! Timestamp formatting for record output

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timestamp layout used by appenders
///
/// # Examples
///
/// ```
/// use ctxlog::TimestampFormat;
/// use chrono::Utc;
///
/// let stamp = TimestampFormat::Iso8601.format(&Utc::now());
/// assert!(stamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789Z`
    #[default]
    Rfc3339Nano,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime layout, e.g. `"%Y-%m-%dT%H:%M:%S%.3f%z"`
    ///
    /// A layout chrono cannot parse falls back to RFC 3339 when formatting;
    /// [`check`](TimestampFormat::check) rejects it up front.
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339Nano => datetime.to_rfc3339_opts(SecondsFormat::Nanos, true),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(layout) => {
                let mut out = String::with_capacity(layout.len() + 16);
                match write!(out, "{}", datetime.format(layout)) {
                    Ok(()) => out,
                    Err(_) => datetime.to_rfc3339_opts(SecondsFormat::Nanos, true),
                }
            }
        }
    }

    /// Reject custom layouts that are empty or contain an unknown specifier
    pub fn check(&self) -> Result<()> {
        let TimestampFormat::Custom(layout) = self else {
            return Ok(());
        };
        if layout.is_empty() {
            return Err(LoggerError::config(
                "timestamp_format",
                "custom layout must not be empty",
            ));
        }
        if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "timestamp_format",
                format!("invalid strftime layout: '{}'", layout),
            ));
        }
        Ok(())
    }

    /// JSON rendering: numeric layouts stay numbers
    pub(crate) fn to_json_value(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(datetime.timestamp_millis().into())
            }
            _ => serde_json::Value::String(self.format(datetime)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_rfc3339_nano() {
        let result = TimestampFormat::Rfc3339Nano.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456000Z");
    }

    #[test]
    fn test_iso8601() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_custom_layout_parses_back() {
        let layout = "%Y-%m-%dT%H:%M:%S%.3f%z";
        let result = TimestampFormat::Custom(layout.to_string()).format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123+0000");
        assert!(DateTime::parse_from_str(&result, layout).is_ok());
    }

    #[test]
    fn test_check_rejects_unknown_specifier() {
        let bad = TimestampFormat::Custom("%Y-%m-%Q".to_string());
        assert!(matches!(
            bad.check(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(TimestampFormat::Custom(String::new()).check().is_err());
        assert!(TimestampFormat::Custom("%H:%M:%S%.3f".to_string()).check().is_ok());
        assert!(TimestampFormat::Rfc3339Nano.check().is_ok());
    }

    #[test]
    fn test_invalid_custom_layout_does_not_panic() {
        let result = TimestampFormat::Custom("%Q".to_string()).format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456000Z");
    }

    #[test]
    fn test_unix_millis_is_numeric_in_json() {
        let value = TimestampFormat::UnixMillis.to_json_value(&fixed_datetime());
        assert!(value.is_number());
        assert!(TimestampFormat::Iso8601.to_json_value(&fixed_datetime()).is_string());
    }
}

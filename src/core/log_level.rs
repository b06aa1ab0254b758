//! Log level definitions

use super::error::{LoggerError, Result};
use super::overflow_policy::LogPriority;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LogLevel {
    #[default]
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Preservation priority when the async queue is full
    pub fn priority(&self) -> LogPriority {
        match self {
            LogLevel::Debug | LogLevel::Info => LogPriority::Normal,
            LogLevel::Warn => LogPriority::High,
            LogLevel::Error => LogPriority::Critical,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Magenta,
            LogLevel::Info => Blue,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(LoggerError::config(
                "LogLevel",
                format!("unknown log level: '{}'", s),
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Parse a level name, falling back to [`LogLevel::Info`] alongside the error.
///
/// Useful when reading a level from the environment: the caller can report
/// the error and keep running with a sensible threshold.
pub fn parse_level(s: &str) -> (LogLevel, Option<LoggerError>) {
    match s.parse() {
        Ok(level) => (level, None),
        Err(err) => (LogLevel::Info, Some(err)),
    }
}

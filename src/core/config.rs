//! Logger configuration
//!
//! [`LoggerConfig`] can be built in code, deserialized with serde, or read
//! from the process environment:
//!
//! | Variable        | Field          | Example      |
//! |-----------------|----------------|--------------|
//! | `CTXLOG_ENV`    | `environment`  | `DEV`        |
//! | `CTXLOG_LEVEL`  | `level`        | `warning`    |
//! | `CTXLOG_NAME`   | `name`         | `billing`    |
//! | `CTXLOG_SOURCE` | `add_source`   | `false`      |

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::output_format::OutputFormat;
use super::overflow_policy::OverflowPolicy;
use super::sampling::SamplingConfig;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ENV_VAR: &str = "CTXLOG_ENV";
pub const LEVEL_VAR: &str = "CTXLOG_LEVEL";
pub const NAME_VAR: &str = "CTXLOG_NAME";
pub const SOURCE_VAR: &str = "CTXLOG_SOURCE";

/// Deployment mode, selecting the output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Environment {
    /// Readable tab-separated text with colored levels
    Development,
    /// Compact JSON, one object per line
    #[default]
    Production,
}

impl Environment {
    pub fn output_format(&self) -> OutputFormat {
        match self {
            Environment::Development => OutputFormat::Text,
            Environment::Production => OutputFormat::Json,
        }
    }

    pub fn use_colors(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "DEVELOPMENT"),
            Environment::Production => write!(f, "PRODUCTION"),
        }
    }
}

impl FromStr for Environment {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEV" | "DEVELOPMENT" => Ok(Environment::Development),
            "PROD" | "PRODUCTION" => Ok(Environment::Production),
            _ => Err(LoggerError::config(
                "Environment",
                format!("unknown environment type: '{}'", s),
            )),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Everything needed to construct a [`crate::Logger`]
///
/// ```
/// use ctxlog::{Environment, LogLevel, LoggerConfig};
///
/// let config: LoggerConfig = serde_json::from_str(
///     r#"{"environment": "dev", "level": "warn", "name": "api"}"#,
/// ).unwrap();
///
/// assert_eq!(config.environment, Environment::Development);
/// assert_eq!(config.level, LogLevel::Warn);
/// assert!(config.add_source);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub environment: Environment,

    /// Minimum level written
    pub level: LogLevel,

    /// Added to every record as `logger`, omitted when empty
    pub name: String,

    /// Attach the trimmed call site as `source`
    pub add_source: bool,

    pub timestamp_format: TimestampFormat,

    /// Tick sampler, disabled when `None` or when the tick is zero
    pub sampling: Option<SamplingConfig>,

    /// Copy trace and span ids from the context into each record
    pub tracing: bool,

    /// Records at or above this level carry a captured backtrace
    pub stacktrace_level: Option<LogLevel>,

    /// Queue capacity of the background writer; synchronous when `None`
    pub async_buffer: Option<usize>,

    pub overflow_policy: OverflowPolicy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            level: LogLevel::Debug,
            name: String::new(),
            add_source: true,
            timestamp_format: TimestampFormat::Rfc3339Nano,
            sampling: None,
            tracing: false,
            stacktrace_level: None,
            async_buffer: None,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl LoggerConfig {
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self::default()
    }

    /// Defaults overridden by the `CTXLOG_*` variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(env) = lookup(ENV_VAR) {
            config.environment = env.parse()?;
        }
        if let Some(level) = lookup(LEVEL_VAR) {
            config.level = level.parse()?;
        }
        if let Some(name) = lookup(NAME_VAR) {
            config.name = name;
        }
        if let Some(source) = lookup(SOURCE_VAR) {
            config.add_source = parse_bool(SOURCE_VAR, &source)?;
        }

        Ok(config)
    }

    /// Reject settings the backend cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.async_buffer == Some(0) {
            return Err(LoggerError::config(
                "async_buffer",
                "buffer size must be greater than zero",
            ));
        }
        if let Some(ref sampling) = self.sampling {
            if sampling.is_enabled() && sampling.first == 0 && sampling.thereafter == 0 {
                return Err(LoggerError::config(
                    "sampling",
                    "first and thereafter are both zero, every record would be dropped",
                ));
            }
        }
        self.timestamp_format.check()
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LoggerError::config(
            var,
            format!("expected a boolean, got '{}'", value),
        )),
    }
}

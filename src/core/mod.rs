//! Core logger types and traits

pub mod appender;
pub(crate) mod backend;
pub mod caller;
pub mod config;
pub mod context;
pub mod error;
pub mod field;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod overflow_policy;
pub mod sampling;
pub mod timestamp;

pub use appender::Appender;
pub use backend::DEFAULT_SHUTDOWN_TIMEOUT;
pub use caller::{trimmed_path, CallSite, CallerResolver, LocationResolver, DEFAULT_SKIP, METHOD_SKIP};
#[cfg(feature = "stack-walk")]
pub use caller::StackWalkResolver;
pub use config::{Environment, LoggerConfig};
pub use context::{
    from_context, get_skip_call_stack, in_context, must_context, new_context, set_skip_call_stack,
    test_context, to_context, try_from_context, Context,
};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use log_level::{parse_level, LogLevel};
pub use log_record::{LogRecord, TracingContext};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy};
pub use sampling::{LogSampler, SamplerMetrics, SamplingConfig};
pub use timestamp::TimestampFormat;

//! # ctxlog
//!
//! Structured logging carried through an explicit request context.
//!
//! A [`Logger`] is built once, bound into a [`Context`], and the context is
//! passed down the call graph. Code that receives the context logs through
//! the free functions ([`info`], [`warn`], ...) or the macros without ever
//! taking a logger parameter. Every record carries the call site that issued
//! it as `source`, in the short `dir/file.rs:line` form.
//!
//! ## Features
//!
//! - **Context propagation**: immutable, cheaply clonable contexts; rebinding
//!   a logger shadows the parent binding instead of mutating it
//! - **Typed fields and groups**: `with` and `with_group` derive new handles
//!   sharing one backend
//! - **Accurate call sites**: `#[track_caller]` through every layer, with an
//!   optional stack-walking resolver (`stack-walk` feature)
//! - **Backend**: console output (colored text in development, JSON in
//!   production), tick sampling, optional async writer with overflow policy
//!
//! ```
//! use ctxlog::{fields, Logger, LoggerConfig};
//!
//! let logger = Logger::new(LoggerConfig::development()).unwrap();
//! let ctx = ctxlog::to_context(None, logger);
//!
//! let ctx = ctxlog::with(&ctx, &fields!["request_id" => "r-1"]);
//! ctxlog::info(&ctx, "request accepted", &fields!["method" => "GET"]);
//!
//! ctxlog::sync(&ctx).unwrap();
//! ```

pub mod adapters;
pub mod appenders;
pub mod core;
pub mod helpers;
pub mod located_error;
pub mod macros;
pub mod wrapper;

pub mod prelude {
    pub use crate::appenders::{CaptureBuffer, ConsoleAppender};
    pub use crate::core::{
        from_context, in_context, to_context, try_from_context, Appender, Context, Environment,
        Field, FieldValue, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        OutputFormat, OverflowPolicy, Result, SamplingConfig, TimestampFormat, TracingContext,
    };
    pub use crate::helpers::{close_and_log_error, Close};
    pub use crate::wrapper::{ContextLogger, ContextWrapper, StubLogger};
    pub use crate::fields;
}

pub use appenders::{CaptureAppender, CaptureBuffer, ConsoleAppender};
pub use core::{
    from_context, get_skip_call_stack, in_context, must_context, new_context, parse_level,
    set_skip_call_stack, test_context, to_context, trimmed_path, try_from_context, Appender,
    CallSite, CallerResolver, Context, Environment, Field, FieldValue, LocationResolver, LogLevel,
    LogPriority, LogRecord, LogSampler, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, OutputFormat, OverflowCallback, OverflowPolicy, Result, SamplerMetrics,
    SamplingConfig, TimestampFormat, TracingContext, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_SKIP,
    METHOD_SKIP,
};
#[cfg(feature = "stack-walk")]
pub use core::StackWalkResolver;
pub use helpers::{
    close_and_log_error, debug, error, info, log, log_with_level, sync, warn, with, with_group,
    Close,
};
pub use located_error::LocatedError;
pub use wrapper::{ContextLogger, ContextWrapper, StubLogger};

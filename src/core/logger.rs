//! The logger handle
//!
//! A [`Logger`] is an immutable value: `with` and `with_group` return new
//! handles that share the backend of the original. Cloning is a reference
//! count increment.

use super::{
    appender::Appender,
    backend::Backend,
    caller::{CallerResolver, LocationResolver, METHOD_SKIP},
    config::{Environment, LoggerConfig},
    context::{get_skip_call_stack, Context},
    error::{LoggerError, Result},
    field::{Field, ScopedFields},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    sampling::{LogSampler, SamplerMetrics, SamplingConfig},
    timestamp::TimestampFormat,
};
use crate::appenders::{CaptureAppender, CaptureBuffer, ConsoleAppender};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Settings and sink shared by every handle derived from one logger
struct Shared {
    backend: Backend,
    resolver: Box<dyn CallerResolver>,
    min_level: LogLevel,
    name: String,
    add_source: bool,
    tracing: bool,
    stacktrace_level: Option<LogLevel>,
}

struct LoggerInner {
    shared: Arc<Shared>,
    fields: ScopedFields,
    groups: Vec<String>,
}

/// Structured logger handle
///
/// ```
/// use ctxlog::fields;
///
/// let (ctx, buffer) = ctxlog::test_context(None);
/// let logger = ctxlog::from_context(&ctx).with(&fields!["request_id" => "r-1"]);
///
/// logger.info(&ctx, "handled", &fields!["status" => 200]);
/// assert!(buffer.contents().contains("request_id=r-1 status=200"));
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Build a logger from `config`, writing to the console
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::builder().config(config).try_build()
    }

    /// Like [`Logger::new`], panicking on an invalid configuration
    pub fn must(config: LoggerConfig) -> Self {
        match Self::new(config) {
            Ok(logger) => logger,
            Err(e) => panic!("failed to create logger: {}", e),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Whether both handles are the same value, not merely equivalent
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether both handles write through the same backend
    pub fn shares_backend(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner.shared, &other.inner.shared)
    }

    pub fn min_level(&self) -> LogLevel {
        self.inner.shared.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.inner.shared.min_level
    }

    pub fn name(&self) -> &str {
        &self.inner.shared.name
    }

    /// Open group names, outermost first
    pub fn groups(&self) -> &[String] {
        &self.inner.groups
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.inner.shared.backend.metrics()
    }

    pub fn sampler_metrics(&self) -> Option<&SamplerMetrics> {
        self.inner.shared.backend.sampler().map(LogSampler::metrics)
    }

    /// A handle whose records also carry `fields`, placed in the currently
    /// open group. Returns this same handle when `fields` is empty.
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }

        let mut scoped = self.inner.fields.clone();
        scoped.extend(self.inner.groups.len(), fields);
        Logger {
            inner: Arc::new(LoggerInner {
                shared: Arc::clone(&self.inner.shared),
                fields: scoped,
                groups: self.inner.groups.clone(),
            }),
        }
    }

    /// A handle that nests fields added afterwards, and per-record fields,
    /// under `name`. Returns this same handle when `name` is empty.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }

        let mut groups = self.inner.groups.clone();
        groups.push(name.to_string());
        Logger {
            inner: Arc::new(LoggerInner {
                shared: Arc::clone(&self.inner.shared),
                fields: self.inner.fields.clone(),
                groups,
            }),
        }
    }

    #[track_caller]
    pub fn log(&self, ctx: &Context, level: LogLevel, message: impl Into<String>, fields: &[Field]) {
        self.log_at(ctx, level, message, METHOD_SKIP, fields);
    }

    /// Log with an explicit frame count for source resolution. A skip
    /// override bound in `ctx` takes precedence over `skip`.
    #[track_caller]
    pub fn log_at(
        &self,
        ctx: &Context,
        level: LogLevel,
        message: impl Into<String>,
        skip: usize,
        fields: &[Field],
    ) {
        if !self.enabled(level) {
            return;
        }
        let skip = get_skip_call_stack(ctx).unwrap_or(skip);
        self.emit(ctx, level, message.into(), skip, fields, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, ctx: &Context, message: impl Into<String>, fields: &[Field]) {
        self.log_at(ctx, LogLevel::Debug, message, METHOD_SKIP, fields);
    }

    #[track_caller]
    pub fn info(&self, ctx: &Context, message: impl Into<String>, fields: &[Field]) {
        self.log_at(ctx, LogLevel::Info, message, METHOD_SKIP, fields);
    }

    #[track_caller]
    pub fn warn(&self, ctx: &Context, message: impl Into<String>, fields: &[Field]) {
        self.log_at(ctx, LogLevel::Warn, message, METHOD_SKIP, fields);
    }

    #[track_caller]
    pub fn error(&self, ctx: &Context, message: impl Into<String>, fields: &[Field]) {
        self.log_at(ctx, LogLevel::Error, message, METHOD_SKIP, fields);
    }

    #[inline(never)]
    fn emit(
        &self,
        ctx: &Context,
        level: LogLevel,
        message: String,
        skip: usize,
        fields: &[Field],
        location: &'static Location<'static>,
    ) {
        let shared = &self.inner.shared;
        if !shared.backend.should_sample(level, &message) {
            return;
        }

        let source = if shared.add_source {
            shared
                .resolver
                .resolve(skip, location)
                .map(|site| site.trimmed())
        } else {
            None
        };

        let fields = if self.inner.fields.is_empty() && self.inner.groups.is_empty() {
            fields.to_vec()
        } else {
            self.inner.fields.assemble(&self.inner.groups, fields)
        };

        let mut record = LogRecord::new(level, message)
            .with_logger_name(shared.name.as_str())
            .with_source(source)
            .with_fields(fields);

        if shared.tracing {
            if let Some(trace) = ctx.trace() {
                record = record.with_trace(trace.clone());
            }
        }

        if shared.stacktrace_level.is_some_and(|threshold| level >= threshold) {
            record = record.with_stacktrace(Backtrace::force_capture().to_string());
        }

        shared.backend.write(record);
    }

    /// Flush everything written so far.
    ///
    /// An invalid-descriptor failure (the output stream is already closed)
    /// is not an error; any other failure is returned as
    /// [`LoggerError::Sync`].
    pub fn sync(&self) -> Result<()> {
        match self.inner.shared.backend.flush() {
            Ok(()) => Ok(()),
            Err(e) if e.is_invalid_descriptor() => Ok(()),
            Err(e) => Err(LoggerError::sync(e)),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = &self.inner.shared;
        f.debug_struct("Logger")
            .field("name", &shared.name)
            .field("min_level", &shared.min_level)
            .field("add_source", &shared.add_source)
            .field("groups", &self.inner.groups)
            .field("async", &shared.backend.is_async())
            .finish()
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// ```
/// use ctxlog::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .environment(Environment::Development)
///     .level(LogLevel::Info)
///     .name("worker")
///     .async_mode(1000)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} logs dropped", count);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    appenders: Vec<Box<dyn Appender>>,
    capture: Option<CaptureBuffer>,
    resolver: Option<Box<dyn CallerResolver>>,
    on_overflow: Option<OverflowCallback>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            appenders: Vec::new(),
            capture: None,
            resolver: None,
            on_overflow: None,
        }
    }

    /// Replace every configuration knob at once
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn add_source(mut self, add_source: bool) -> Self {
        self.config.add_source = add_source;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, sampling: SamplingConfig) -> Self {
        self.config.sampling = Some(sampling);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn tracing(mut self, tracing: bool) -> Self {
        self.config.tracing = tracing;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_level(mut self, level: LogLevel) -> Self {
        self.config.stacktrace_level = Some(level);
        self
    }

    /// Add an appender. When none is added the logger writes to the console.
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Also write every record, formatted for the environment, into `buffer`
    #[must_use = "builder methods return a new value"]
    pub fn capture(mut self, buffer: CaptureBuffer) -> Self {
        self.capture = Some(buffer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn resolver<R: CallerResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Write through a background thread with a queue of `buffer_size`
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, buffer_size: usize) -> Self {
        self.config.async_buffer = Some(buffer_size);
        self
    }

    /// What to do when the async queue is full. Default is `AlertAndDrop`.
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow_policy = policy;
        self
    }

    /// Called with the running total when records are dropped on overflow
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Validate the configuration and build
    pub fn try_build(self) -> Result<Logger> {
        self.config.validate()?;
        Ok(self.build())
    }

    /// Build without validating the configuration
    pub fn build(self) -> Logger {
        let LoggerBuilder {
            config,
            mut appenders,
            capture,
            resolver,
            on_overflow,
        } = self;

        let output_format = config.environment.output_format();

        if let Some(buffer) = capture {
            appenders.push(Box::new(
                CaptureAppender::new(buffer)
                    .with_output_format(output_format)
                    .with_timestamp_format(config.timestamp_format.clone()),
            ));
        } else if appenders.is_empty() {
            appenders.push(Box::new(
                ConsoleAppender::with_colors(config.environment.use_colors())
                    .with_output_format(output_format)
                    .with_timestamp_format(config.timestamp_format.clone()),
            ));
        }

        let sampler = config
            .sampling
            .filter(SamplingConfig::is_enabled)
            .map(LogSampler::new);

        let backend = Backend::new(
            appenders,
            config.async_buffer,
            config.overflow_policy.clone(),
            on_overflow,
            sampler,
        );

        let shared = Shared {
            backend,
            resolver: resolver.unwrap_or_else(|| Box::new(LocationResolver)),
            min_level: config.level,
            name: config.name,
            add_source: config.add_source,
            tracing: config.tracing,
            stacktrace_level: config.stacktrace_level,
        };

        Logger {
            inner: Arc::new(LoggerInner {
                shared: Arc::new(shared),
                fields: ScopedFields::default(),
                groups: Vec::new(),
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Request-scoped propagation context
//!
//! A [`Context`] is an immutable chain of typed values. Deriving a child
//! context never touches the parent, so a context can be shared freely
//! across threads and tasks while each call subtree sees only the values
//! bound above it. The logger and the stack-skip override are stored under
//! private key types, the same way application values are stored under
//! their own types.

use super::config::LoggerConfig;
use super::error::Result;
use super::log_record::TracingContext;
use super::logger::Logger;
use crate::appenders::CaptureBuffer;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct ContextNode {
    parent: Option<Arc<ContextNode>>,
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
}

/// Immutable, cheaply clonable carrier of request-scoped values
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<ContextNode>>,
}

#[derive(Clone)]
struct BoundLogger(Logger);

#[derive(Clone, Copy)]
struct SkipOverride(usize);

impl Context {
    /// Empty root context
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying `value`, shadowing any value of the same type
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(ContextNode {
                parent: self.head.clone(),
                key: TypeId::of::<T>(),
                value: Box::new(value),
            })),
        }
    }

    /// The nearest value of type `T` bound in this chain
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if current.key == key {
                return current.value.downcast_ref::<T>();
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Derive a context with `logger` bound
    #[must_use]
    pub fn with_logger(&self, logger: Logger) -> Self {
        self.with_value(BoundLogger(logger))
    }

    /// Derive a context carrying distributed-tracing identifiers
    #[must_use]
    pub fn with_trace(&self, trace: TracingContext) -> Self {
        self.with_value(trace)
    }

    pub fn trace(&self) -> Option<&TracingContext> {
        self.value::<TracingContext>()
    }

    /// Number of values bound in this chain
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = current.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .field("has_logger", &in_context(self))
            .field("skip_override", &get_skip_call_stack(self))
            .finish()
    }
}

/// Bind `logger` into a context derived from `ctx`, or from an empty root
/// when `ctx` is `None`. An existing binding is shadowed, not replaced.
pub fn to_context(ctx: Option<&Context>, logger: Logger) -> Context {
    match ctx {
        Some(ctx) => ctx.with_logger(logger),
        None => Context::background().with_logger(logger),
    }
}

/// The logger bound in `ctx`.
///
/// # Panics
///
/// Panics if no logger is bound. Code that logs must only be reachable from
/// a context that was established with a logger.
pub fn from_context(ctx: &Context) -> Logger {
    match try_from_context(ctx) {
        Some(logger) => logger,
        None => panic!("context does not have a logger"),
    }
}

/// The logger bound in `ctx`, if any
pub fn try_from_context(ctx: &Context) -> Option<Logger> {
    ctx.value::<BoundLogger>().map(|bound| bound.0.clone())
}

/// Whether a logger is bound in `ctx`
pub fn in_context(ctx: &Context) -> bool {
    ctx.value::<BoundLogger>().is_some()
}

/// Derive a context whose log calls resolve their source `skip` frames up
pub fn set_skip_call_stack(ctx: &Context, skip: usize) -> Context {
    ctx.with_value(SkipOverride(skip))
}

/// The skip override bound in `ctx`, if any
pub fn get_skip_call_stack(ctx: &Context) -> Option<usize> {
    ctx.value::<SkipOverride>().map(|skip| skip.0)
}

/// Build a logger from `config` and bind it into a context derived from `ctx`
pub fn new_context(ctx: Option<&Context>, config: LoggerConfig) -> Result<Context> {
    let logger = Logger::new(config)?;
    Ok(to_context(ctx, logger))
}

/// Like [`new_context`], panicking on configuration errors
pub fn must_context(ctx: Option<&Context>, config: LoggerConfig) -> Context {
    to_context(ctx, Logger::must(config))
}

/// A context whose logger writes into an in-memory buffer, for tests.
///
/// The logger runs in development mode at debug level without colors.
pub fn test_context(ctx: Option<&Context>) -> (Context, CaptureBuffer) {
    let buffer = CaptureBuffer::new();
    let logger = Logger::builder()
        .config(LoggerConfig::development())
        .capture(buffer.clone())
        .build();
    (to_context(ctx, logger), buffer)
}

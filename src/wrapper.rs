//! A logging trait for code that should not depend on [`crate::Logger`]
//!
//! Libraries take a `&dyn ContextLogger` (or a generic) and applications pass
//! either [`ContextWrapper`], which logs through the logger bound in the
//! context, or [`StubLogger`], which discards everything.

use crate::core::{Context, Field, LogLevel, DEFAULT_SKIP};
use crate::helpers::log_with_level;

/// Leveled logging through a context
///
/// The methods are `#[track_caller]`, which every implementation inherits,
/// so the source of a record is the line calling the trait method even
/// through `dyn ContextLogger`.
pub trait ContextLogger: Send + Sync {
    #[track_caller]
    fn debug(&self, ctx: &Context, message: &str, fields: &[Field]);
    #[track_caller]
    fn info(&self, ctx: &Context, message: &str, fields: &[Field]);
    #[track_caller]
    fn warn(&self, ctx: &Context, message: &str, fields: &[Field]);
    #[track_caller]
    fn error(&self, ctx: &Context, message: &str, fields: &[Field]);
}

/// Forwards to the logger bound in the context
///
/// ```
/// use ctxlog::{test_context, ContextLogger, ContextWrapper};
///
/// let (ctx, buffer) = test_context(None);
/// let logger: Box<dyn ContextLogger> = Box::new(ContextWrapper);
///
/// logger.warn(&ctx, "slow request", &[]);
/// assert!(buffer.contents().contains("slow request"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextWrapper;

impl ContextLogger for ContextWrapper {
    fn debug(&self, ctx: &Context, message: &str, fields: &[Field]) {
        log_with_level(ctx, LogLevel::Debug, message, DEFAULT_SKIP, fields);
    }

    fn info(&self, ctx: &Context, message: &str, fields: &[Field]) {
        log_with_level(ctx, LogLevel::Info, message, DEFAULT_SKIP, fields);
    }

    fn warn(&self, ctx: &Context, message: &str, fields: &[Field]) {
        log_with_level(ctx, LogLevel::Warn, message, DEFAULT_SKIP, fields);
    }

    fn error(&self, ctx: &Context, message: &str, fields: &[Field]) {
        log_with_level(ctx, LogLevel::Error, message, DEFAULT_SKIP, fields);
    }
}

/// Discards every record; needs no logger in the context
#[derive(Debug, Clone, Copy, Default)]
pub struct StubLogger;

impl ContextLogger for StubLogger {
    fn debug(&self, _ctx: &Context, _message: &str, _fields: &[Field]) {}

    fn info(&self, _ctx: &Context, _message: &str, _fields: &[Field]) {}

    fn warn(&self, _ctx: &Context, _message: &str, _fields: &[Field]) {}

    fn error(&self, _ctx: &Context, _message: &str, _fields: &[Field]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_context;
    use crate::fields;

    #[test]
    fn test_wrapper_forwards_levels() {
        let (ctx, buffer) = test_context(None);
        let logger = ContextWrapper;

        logger.debug(&ctx, "d", &[]);
        logger.info(&ctx, "i", &fields!["n" => 1]);
        logger.warn(&ctx, "w", &[]);
        logger.error(&ctx, "e", &[]);

        let messages: Vec<String> = buffer.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, ["d", "i", "w", "e"]);
    }

    #[test]
    fn test_wrapper_source_through_dyn() {
        let (ctx, buffer) = test_context(None);
        let logger: &dyn ContextLogger = &ContextWrapper;

        let line = line!() + 1;
        logger.info(&ctx, "dyn call", &[]);

        let expected = format!("src/wrapper.rs:{}", line);
        assert_eq!(buffer.records()[0].source.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_stub_needs_no_logger() {
        let ctx = Context::background();
        let logger = StubLogger;

        logger.debug(&ctx, "ignored", &[]);
        logger.info(&ctx, "ignored", &[]);
        logger.warn(&ctx, "ignored", &[]);
        logger.error(&ctx, "ignored", &[]);
    }
}

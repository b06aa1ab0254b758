//! Free functions that log through the logger bound in a [`Context`]
//!
//! ```
//! use ctxlog::{fields, test_context};
//!
//! let (ctx, buffer) = test_context(None);
//! let ctx = ctxlog::with(&ctx, &fields!["request_id" => "r-42"]);
//!
//! ctxlog::info(&ctx, "request handled", &fields!["status" => 200]);
//! assert!(buffer.contents().contains("request_id=r-42 status=200"));
//! ```
//!
//! Every function here panics if no logger is bound in the context.

use crate::core::{
    from_context, get_skip_call_stack, set_skip_call_stack, to_context, Context, Field, LogLevel,
    Result, DEFAULT_SKIP,
};
use std::any::type_name;
use std::fmt::Display;

#[track_caller]
pub fn debug(ctx: &Context, message: impl Into<String>, fields: &[Field]) {
    log_with_level(ctx, LogLevel::Debug, message, DEFAULT_SKIP, fields);
}

#[track_caller]
pub fn info(ctx: &Context, message: impl Into<String>, fields: &[Field]) {
    log_with_level(ctx, LogLevel::Info, message, DEFAULT_SKIP, fields);
}

#[track_caller]
pub fn warn(ctx: &Context, message: impl Into<String>, fields: &[Field]) {
    log_with_level(ctx, LogLevel::Warn, message, DEFAULT_SKIP, fields);
}

#[track_caller]
pub fn error(ctx: &Context, message: impl Into<String>, fields: &[Field]) {
    log_with_level(ctx, LogLevel::Error, message, DEFAULT_SKIP, fields);
}

#[track_caller]
pub fn log(ctx: &Context, level: LogLevel, message: impl Into<String>, fields: &[Field]) {
    log_with_level(ctx, level, message, DEFAULT_SKIP, fields);
}

/// Log at `level` with `skip` frames between the resolver and the call
/// site.
///
/// `skip` is only installed when `ctx` has no override yet, so the
/// outermost layer decides and nested helpers reuse its value. A wrapper
/// that calls this directly passes [`DEFAULT_SKIP`]; each further layer of
/// indirection adds one.
#[track_caller]
pub fn log_with_level(
    ctx: &Context,
    level: LogLevel,
    message: impl Into<String>,
    skip: usize,
    fields: &[Field],
) {
    let logger = from_context(ctx);
    if !logger.enabled(level) {
        return;
    }

    match get_skip_call_stack(ctx) {
        Some(_) => logger.log_at(ctx, level, message, skip, fields),
        None => {
            let ctx = set_skip_call_stack(ctx, skip);
            logger.log_at(&ctx, level, message, skip, fields);
        }
    }
}

/// Rebind the context's logger with `fields` added
pub fn with(ctx: &Context, fields: &[Field]) -> Context {
    to_context(Some(ctx), from_context(ctx).with(fields))
}

/// Rebind the context's logger with group `name` opened. An empty name
/// leaves the bound logger as it is.
pub fn with_group(ctx: &Context, name: &str) -> Context {
    to_context(Some(ctx), from_context(ctx).with_group(name))
}

/// Flush the bound logger
pub fn sync(ctx: &Context) -> Result<()> {
    from_context(ctx).sync()
}

/// A resource with a fallible close operation
pub trait Close {
    type Error: Display;

    fn close(&mut self) -> std::result::Result<(), Self::Error>;
}

/// Close `resource`, logging a failure at Error level instead of returning it.
///
/// The record is `"failed to close"` with the resource's type name under
/// `type` and the failure under `error`.
///
/// ```
/// use ctxlog::{close_and_log_error, test_context, Close};
///
/// struct Conn;
///
/// impl Close for Conn {
///     type Error = String;
///     fn close(&mut self) -> Result<(), String> {
///         Err("broken pipe".to_string())
///     }
/// }
///
/// let (ctx, buffer) = test_context(None);
/// close_and_log_error(&ctx, &mut Conn);
/// assert!(buffer.contents().contains("broken pipe"));
/// ```
#[track_caller]
pub fn close_and_log_error<C: Close>(ctx: &Context, resource: &mut C) {
    if let Err(e) = resource.close() {
        let fields = [
            Field::new("type", type_name::<C>()),
            Field::display("error", e),
        ];
        log_with_level(ctx, LogLevel::Error, "failed to close", DEFAULT_SKIP, &fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{test_context, try_from_context, METHOD_SKIP};
    use crate::fields;

    struct Disk {
        fail: bool,
        closed: bool,
    }

    impl Close for Disk {
        type Error = std::io::Error;

        fn close(&mut self) -> std::result::Result<(), Self::Error> {
            self.closed = true;
            if self.fail {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_level_helpers() {
        let (ctx, buffer) = test_context(None);

        debug(&ctx, "d", &[]);
        info(&ctx, "i", &[]);
        warn(&ctx, "w", &[]);
        error(&ctx, "e", &[]);
        log(&ctx, LogLevel::Info, "l", &fields!["k" => "v"]);

        let levels: Vec<LogLevel> = buffer.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            [
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warn,
                LogLevel::Error,
                LogLevel::Info
            ]
        );
        assert!(buffer.lines()[4].ends_with("k=v"));
    }

    #[test]
    fn test_helper_source_is_call_site() {
        let (ctx, buffer) = test_context(None);
        let line = line!() + 1;
        info(&ctx, "where", &[]);

        let expected = format!("src/helpers.rs:{}", line);
        assert_eq!(buffer.records()[0].source.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_log_with_level_respects_existing_override() {
        let (ctx, buffer) = test_context(None);
        let ctx = set_skip_call_stack(&ctx, METHOD_SKIP + 2);

        log_with_level(&ctx, LogLevel::Warn, "nested", DEFAULT_SKIP, &[]);

        assert_eq!(buffer.len(), 1);
        assert_eq!(get_skip_call_stack(&ctx), Some(METHOD_SKIP + 2));
    }

    #[test]
    #[should_panic(expected = "context does not have a logger")]
    fn test_helpers_panic_without_logger() {
        info(&Context::background(), "lost", &[]);
    }

    #[test]
    fn test_with_and_with_group_rebind() {
        let (ctx, buffer) = test_context(None);
        let original = try_from_context(&ctx).unwrap();

        let same = with_group(&ctx, "");
        assert!(try_from_context(&same).unwrap().ptr_eq(&original));

        let ctx = with(&with_group(&ctx, "http"), &fields!["path" => "/health"]);
        info(&ctx, "healthy", &[]);

        assert!(buffer.lines()[0].ends_with("http.path=/health"));
    }

    #[test]
    fn test_close_and_log_error_logs_failure() {
        let (ctx, buffer) = test_context(None);
        let mut disk = Disk {
            fail: true,
            closed: false,
        };

        close_and_log_error(&ctx, &mut disk);

        assert!(disk.closed);
        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Error);
        assert_eq!(records[0].message, "failed to close");

        let line = &buffer.lines()[0];
        assert!(line.contains("disk full"));
        assert!(line.contains("Disk"));
    }

    #[test]
    fn test_close_and_log_error_source_is_call_site() {
        let (ctx, buffer) = test_context(None);
        let mut disk = Disk {
            fail: true,
            closed: false,
        };

        let line = line!() + 1;
        close_and_log_error(&ctx, &mut disk);

        let expected = format!("src/helpers.rs:{}", line);
        assert_eq!(buffer.records()[0].source.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_close_and_log_error_silent_on_success() {
        let (ctx, buffer) = test_context(None);
        let mut disk = Disk {
            fail: false,
            closed: false,
        };

        close_and_log_error(&ctx, &mut disk);

        assert!(disk.closed);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_sync_through_context() {
        let (ctx, _buffer) = test_context(None);
        assert!(sync(&ctx).is_ok());
    }
}

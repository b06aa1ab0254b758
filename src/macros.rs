//! Logging macros with `format!`-style messages.
//!
//! Fields follow the message after a semicolon:
//!
//! ```
//! use ctxlog::{info, warn, test_context};
//!
//! let (ctx, buffer) = test_context(None);
//!
//! info!(&ctx, "server started");
//! let port = 8080;
//! info!(&ctx, "listening on port {}", port; "tls" => false);
//! warn!(&ctx, "slow response"; "ms" => 1200, "route" => "/users");
//!
//! assert_eq!(buffer.len(), 3);
//! ```
//!
//! Like the helper functions, the macros panic if the context has no
//! logger.

/// Log at a given level.
///
/// ```
/// # let (ctx, _buffer) = ctxlog::test_context(None);
/// use ctxlog::{log, LogLevel};
/// log!(&ctx, LogLevel::Info, "simple message");
/// log!(&ctx, LogLevel::Error, "error code: {}", 500; "retry" => true);
/// ```
#[macro_export]
macro_rules! log {
    ($ctx:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)? ; $($key:expr => $value:expr),+ $(,)?) => {
        $crate::helpers::log($ctx, $level, format!($fmt $(, $arg)*), &$crate::fields![$($key => $value),+])
    };
    ($ctx:expr, $level:expr, $($arg:tt)+) => {
        $crate::helpers::log($ctx, $level, format!($($arg)+), &[])
    };
}

/// Log a debug-level message.
///
/// ```
/// # let (ctx, _buffer) = ctxlog::test_context(None);
/// use ctxlog::debug;
/// debug!(&ctx, "cache state"; "entries" => 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # let (ctx, _buffer) = ctxlog::test_context(None);
/// use ctxlog::error;
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "timeout");
/// error!(&ctx, "request failed: {}", err; "attempt" => 3);
/// ```
#[macro_export]
macro_rules! error {
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::LogLevel::Error, $($arg)+)
    };
}

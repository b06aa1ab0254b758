//! Caller-location resolution for the `source` attribute
//!
//! Every public entry point on the logging path is annotated with
//! `#[track_caller]`, so the location observed by the resolver is the line
//! that called `ctxlog::info(...)` (or `logger.info(...)`), not an internal
//! helper frame. The skip depth threaded through the call chain is only
//! consumed by [`StackWalkResolver`], which inspects the live stack instead.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::panic::Location;

/// Frames between the resolver and the code calling a free helper such as
/// [`crate::info`]: `Logger::emit`, `Logger::log_at`, `log_with_level` and
/// the helper itself.
pub const DEFAULT_SKIP: usize = 4;

/// Frames between the resolver and the code calling a `Logger` level method:
/// `Logger::emit`, `Logger::log_at` and the method itself.
pub const METHOD_SKIP: usize = 3;

/// Source location of the code that issued a log call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: Cow<'static, str>,
    pub line: u32,
}

impl CallSite {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }

    /// Short display form: the last two path segments followed by the line,
    /// or the bare file when it has no parent directory
    pub fn trimmed(&self) -> String {
        trimmed_path(&self.file, self.line)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trimmed())
    }
}

thread_local! {
    static SCRATCH: RefCell<String> = RefCell::new(String::with_capacity(64));
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Keep everything after the penultimate path separator and append `:line`.
///
/// `src/app/handler.rs` at line 12 becomes `app/handler.rs:12` and
/// `src/lib.rs` becomes `src/lib.rs:12`. A path without a parent directory,
/// such as `lib.rs` or `/lib.rs`, is returned bare with no line.
pub fn trimmed_path(file: &str, line: u32) -> String {
    let Some(last) = file.rfind(is_separator) else {
        return file.to_string();
    };
    let start = match file[..last].rfind(is_separator) {
        Some(penultimate) => penultimate + 1,
        None if last == 0 => return file.to_string(),
        None => 0,
    };

    SCRATCH.with(|scratch| {
        let mut buf = scratch.borrow_mut();
        buf.clear();
        buf.push_str(&file[start..]);
        buf.push(':');
        // Writing into a String cannot fail.
        let _ = write!(buf, "{}", line);
        buf.clone()
    })
}

/// Strategy used to locate the call site of a record
///
/// `tracked` is the location captured by `#[track_caller]` at the outermost
/// public entry point; `skip` is the number of frames above the resolver's
/// caller at which the true call site sits.
pub trait CallerResolver: Send + Sync {
    fn resolve(&self, skip: usize, tracked: &'static Location<'static>) -> Option<CallSite>;
}

/// Resolves the call site from the `#[track_caller]` location
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationResolver;

impl CallerResolver for LocationResolver {
    fn resolve(&self, _skip: usize, tracked: &'static Location<'static>) -> Option<CallSite> {
        Some(CallSite::from_location(tracked))
    }
}

/// Resolves the call site by walking the live call stack
///
/// Frame counting depends on the optimizer leaving the logging path
/// un-inlined, so this is meant for debug builds or for code that reaches the
/// logger through wrappers that are not `#[track_caller]`. Callers in that
/// situation set the context skip override to account for their extra frames.
#[cfg(feature = "stack-walk")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StackWalkResolver;

#[cfg(feature = "stack-walk")]
impl CallerResolver for StackWalkResolver {
    #[inline(never)]
    fn resolve(&self, skip: usize, _tracked: &'static Location<'static>) -> Option<CallSite> {
        let mut frames = Vec::with_capacity(skip + 8);
        backtrace::trace(|frame| {
            frames.push(frame.clone());
            frames.len() < 100
        });

        // Drop the frames belonging to the walker itself, up to and
        // including this function.
        let own = frames.iter().position(|frame| {
            let mut is_self = false;
            backtrace::resolve_frame(frame, |symbol| {
                if let Some(name) = symbol.name() {
                    is_self |= name.to_string().contains("StackWalkResolver");
                }
            });
            is_self
        })?;

        frames[own + 1..].iter().skip(skip).find_map(|frame| {
            let mut site = None;
            backtrace::resolve_frame(frame, |symbol| {
                if site.is_some() {
                    return;
                }
                if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                    site = Some(CallSite::new(file.to_string_lossy().into_owned(), line));
                }
            });
            site
        })
    }
}

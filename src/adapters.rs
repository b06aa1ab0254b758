//! Adapters for tools that expect a printf-style logger

use crate::core::{get_skip_call_stack, set_skip_call_stack, Context, DEFAULT_SKIP};
use crate::wrapper::ContextLogger;
use std::fmt;

/// Printf-style logger for migration tooling
///
/// Every message is written at Info level through the wrapped
/// [`ContextLogger`] using the context captured at construction. Unless that
/// context already carries a skip override, one extra frame is added for
/// [`printf`](Self::printf) itself.
///
/// ```
/// use ctxlog::adapters::PrintfAdapter;
/// use ctxlog::{test_context, ContextWrapper};
///
/// let (ctx, buffer) = test_context(None);
/// let adapter = PrintfAdapter::new(ctx, Box::new(ContextWrapper));
///
/// adapter.printf(format_args!("applied migration {}", 7));
/// assert!(adapter.verbose());
/// assert!(buffer.contents().contains("applied migration 7"));
/// ```
pub struct PrintfAdapter {
    ctx: Context,
    logger: Box<dyn ContextLogger>,
}

impl PrintfAdapter {
    pub fn new(ctx: Context, logger: Box<dyn ContextLogger>) -> Self {
        Self { ctx, logger }
    }

    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        let message = match args.as_str() {
            Some(literal) => literal.to_string(),
            None => args.to_string(),
        };
        let ctx = match get_skip_call_stack(&self.ctx) {
            Some(_) => self.ctx.clone(),
            None => set_skip_call_stack(&self.ctx, DEFAULT_SKIP + 1),
        };
        // Tools tend to include their own line endings.
        self.logger.info(&ctx, message.trim_end_matches('\n'), &[]);
    }

    /// Always verbose
    pub fn verbose(&self) -> bool {
        true
    }
}

impl fmt::Debug for PrintfAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintfAdapter")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

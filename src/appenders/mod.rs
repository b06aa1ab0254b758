//! Appender implementations

pub mod capture;
pub mod console;

pub use capture::{CaptureAppender, CaptureBuffer};
pub use console::ConsoleAppender;

pub use crate::core::Appender;

//! Source tagging when the call site is found by walking the stack
//!
//! Run with: cargo test --features stack-walk --test stack_walk

#![cfg(feature = "stack-walk")]

use ctxlog::adapters::PrintfAdapter;
use ctxlog::prelude::*;
use ctxlog::{CaptureBuffer, StackWalkResolver};

struct Broken;

impl Close for Broken {
    type Error = String;

    fn close(&mut self) -> std::result::Result<(), String> {
        Err("reset by peer".to_string())
    }
}

fn walking_context() -> (Context, CaptureBuffer) {
    let buffer = CaptureBuffer::new();
    let logger = Logger::builder()
        .config(LoggerConfig::development())
        .capture(buffer.clone())
        .resolver(StackWalkResolver)
        .build();
    (to_context(None, logger), buffer)
}

fn source_of(buffer: &CaptureBuffer, index: usize) -> Option<String> {
    buffer.records()[index].source.clone()
}

fn here(line: u32) -> Option<String> {
    Some(format!("tests/stack_walk.rs:{}", line))
}

#[test]
fn test_helpers_tag_call_site() {
    let (ctx, buffer) = walking_context();

    let first = line!() + 1;
    ctxlog::debug(&ctx, "debug", &[]);
    ctxlog::info(&ctx, "info", &[]);
    ctxlog::warn(&ctx, "warn", &[]);
    ctxlog::error(&ctx, "error", &[]);

    for offset in 0..4 {
        assert_eq!(source_of(&buffer, offset as usize), here(first + offset));
    }
}

#[test]
fn test_methods_tag_call_site() {
    let (ctx, buffer) = walking_context();
    let logger = from_context(&ctx).with(&fields!["k" => "v"]);

    let first = line!() + 1;
    logger.debug(&ctx, "debug", &[]);
    logger.info(&ctx, "info", &[]);
    logger.warn(&ctx, "warn", &[]);
    logger.error(&ctx, "error", &[]);

    for offset in 0..4 {
        assert_eq!(source_of(&buffer, offset as usize), here(first + offset));
    }
}

#[test]
fn test_context_wrapper_tags_call_site() {
    let (ctx, buffer) = walking_context();

    let first = line!() + 1;
    ContextWrapper.info(&ctx, "info", &[]);
    ContextWrapper.error(&ctx, "error", &[]);

    for offset in 0..2 {
        assert_eq!(source_of(&buffer, offset as usize), here(first + offset));
    }
}

#[test]
fn test_close_and_log_error_tags_call_site() {
    let (ctx, buffer) = walking_context();

    let line = line!() + 1;
    close_and_log_error(&ctx, &mut Broken);

    assert_eq!(buffer.records()[0].message, "failed to close");
    assert_eq!(source_of(&buffer, 0), here(line));
}

#[test]
fn test_printf_adapter_tags_call_site() {
    let (ctx, buffer) = walking_context();
    let adapter = PrintfAdapter::new(ctx, Box::new(ContextWrapper));

    let line = line!() + 1;
    adapter.printf(format_args!("applied {}", 3));

    assert_eq!(buffer.records()[0].message, "applied 3");
    assert_eq!(source_of(&buffer, 0), here(line));
}

//! Source tagging through every public entry point
//!
//! Each record must name the line of this file that issued it, whichever
//! layer of helpers, methods, macros or trait objects it went through.

use ctxlog::adapters::PrintfAdapter;
use ctxlog::prelude::*;
use ctxlog::{test_context, CaptureBuffer, LocatedError};

fn source_of(buffer: &CaptureBuffer, index: usize) -> Option<String> {
    buffer.records()[index].source.clone()
}

fn here(line: u32) -> Option<String> {
    Some(format!("tests/caller_location.rs:{}", line))
}

#[test]
fn test_helpers_tag_call_site() {
    let (ctx, buffer) = test_context(None);

    let first = line!() + 1;
    ctxlog::debug(&ctx, "debug", &[]);
    ctxlog::info(&ctx, "info", &[]);
    ctxlog::warn(&ctx, "warn", &[]);
    ctxlog::error(&ctx, "error", &[]);
    ctxlog::log(&ctx, LogLevel::Info, "log", &[]);

    for offset in 0..5 {
        assert_eq!(source_of(&buffer, offset as usize), here(first + offset));
    }
}

#[test]
fn test_methods_tag_call_site() {
    let (ctx, buffer) = test_context(None);
    let logger = from_context(&ctx).with(&fields!["k" => "v"]).with_group("g");

    let first = line!() + 1;
    logger.debug(&ctx, "debug", &[]);
    logger.info(&ctx, "info", &[]);
    logger.warn(&ctx, "warn", &[]);
    logger.error(&ctx, "error", &[]);
    logger.log(&ctx, LogLevel::Warn, "log", &[]);

    for offset in 0..5 {
        assert_eq!(source_of(&buffer, offset as usize), here(first + offset));
    }
}

#[test]
fn test_macros_tag_call_site() {
    let (ctx, buffer) = test_context(None);

    let first = line!() + 1;
    ctxlog::debug!(&ctx, "debug {}", 1);
    ctxlog::info!(&ctx, "info"; "k" => 1);
    ctxlog::warn!(&ctx, "warn");
    ctxlog::error!(&ctx, "error {}", 4; "k" => 4);

    for offset in 0..4 {
        assert_eq!(source_of(&buffer, offset as usize), here(first + offset));
    }
}

#[test]
fn test_trait_object_tags_call_site() {
    let (ctx, buffer) = test_context(None);
    let logger: Box<dyn ContextLogger> = Box::new(ContextWrapper);

    let line = line!() + 1;
    logger.info(&ctx, "through dyn", &[]);

    assert_eq!(source_of(&buffer, 0), here(line));
}

#[test]
fn test_adapter_and_close_tag_call_site() {
    struct Failing;

    impl Close for Failing {
        type Error = &'static str;

        fn close(&mut self) -> std::result::Result<(), &'static str> {
            Err("refused")
        }
    }

    let (ctx, buffer) = test_context(None);
    let adapter = PrintfAdapter::new(ctx.clone(), Box::new(ContextWrapper));

    let first = line!() + 1;
    adapter.printf(format_args!("migrated {}", 1));
    close_and_log_error(&ctx, &mut Failing);

    assert_eq!(source_of(&buffer, 0), here(first));
    assert_eq!(source_of(&buffer, 1), here(first + 1));
}

#[test]
fn test_source_can_be_disabled() {
    let buffer = CaptureBuffer::new();
    let logger = Logger::builder()
        .environment(Environment::Development)
        .add_source(false)
        .capture(buffer.clone())
        .build();
    let ctx = to_context(None, logger);

    ctxlog::info(&ctx, "anonymous", &[]);

    assert_eq!(source_of(&buffer, 0), None);
    assert!(!buffer.contents().contains("caller_location.rs"));
}

#[test]
fn test_located_error_names_creation_site() {
    let line = line!() + 1;
    let err = LocatedError::new("quota exceeded");

    assert_eq!(Some(err.site().to_string()), here(line));
    assert_eq!(
        err.to_string(),
        format!("{{tests/caller_location.rs:{}}} quota exceeded", line)
    );
}

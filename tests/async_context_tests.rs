//! Context propagation across async tasks
//!
//! Contexts are plain values, so a task that receives one logs through the
//! same logger, fields and trace ids as the code that spawned it.

use ctxlog::prelude::*;
use ctxlog::test_context;
use std::time::Duration;

async fn handle_request(ctx: Context, id: u32) {
    let ctx = ctxlog::with(&ctx, &fields!["request_id" => id]);
    ctxlog::info(&ctx, "request started", &[]);
    tokio::time::sleep(Duration::from_millis(5)).await;
    ctxlog::info(&ctx, "request finished", &[]);
}

#[tokio::test]
async fn test_context_moves_into_spawned_tasks() {
    let (ctx, buffer) = test_context(None);

    let tasks: Vec<_> = (0..10)
        .map(|id| tokio::spawn(handle_request(ctx.clone(), id)))
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let records = buffer.records();
    assert_eq!(records.len(), 20);
    for id in 0..10u32 {
        let tagged = records
            .iter()
            .filter(|r| r.field("request_id").map(|f| &f.value) == Some(&FieldValue::from(id)))
            .count();
        assert_eq!(tagged, 2, "request {} missing records", id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_trace_ids_follow_the_context() {
    let buffer = CaptureBuffer::new();
    let logger = Logger::builder()
        .tracing(true)
        .capture(buffer.clone())
        .build();
    let ctx = to_context(None, logger)
        .with_trace(TracingContext::new("trace-1".to_string(), "span-1".to_string()));

    tokio::spawn(async move {
        ctxlog::warn(&ctx, "inside task", &[]);
    })
    .await
    .unwrap();

    let line = &buffer.json_lines()[0];
    assert_eq!(line["trace_id"], "trace-1");
    assert_eq!(line["span_id"], "span-1");
}

#[test]
fn test_sync_from_blocking_section() {
    let (ctx, buffer) = test_context(None);

    tokio_test::block_on(async {
        ctxlog::error(&ctx, "flushed", &[]);
        ctxlog::sync(&ctx).unwrap();
    });

    assert_eq!(buffer.len(), 1);
}

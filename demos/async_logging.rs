//! Async logging example
//!
//! Demonstrates the background writer with an overflow policy, sampling of
//! hot messages, and one context shared by many threads.
//!
//! Run with: cargo run --example async_logging

use ctxlog::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== ctxlog - Async Logging Example ===\n");

    let logger = Logger::builder()
        .config(LoggerConfig::development())
        .async_mode(1000)
        .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
        .on_overflow(Arc::new(|dropped| {
            eprintln!("overflow: {} records dropped so far", dropped);
        }))
        .sampling(SamplingConfig::new(Duration::from_secs(1), 5, 20))
        .try_build()?;
    let ctx = to_context(None, logger.clone());

    println!("1. Sampled hot path:");
    for i in 0..100 {
        ctxlog::info(&ctx, "cache miss", &fields!["i" => i]);
    }
    ctxlog::sync(&ctx)?;
    println!(
        "   100 records issued, {} sampled out",
        logger.metrics().sampled_out()
    );

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let ctx = ctxlog::with(&ctx, &fields!["thread" => thread_id]);
            thread::spawn(move || {
                for i in 0..20 {
                    ctxlog::info(&ctx, format!("message {}", i), &[]);
                    thread::sleep(Duration::from_millis(10));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    ctxlog::sync(&ctx)?;
    println!(
        "   5 threads logged 20 messages each, {} dropped",
        logger.metrics().dropped_count()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}

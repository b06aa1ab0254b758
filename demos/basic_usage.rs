//! Basic context logging example
//!
//! Demonstrates binding a logger into a context, accumulating fields and
//! groups, and logging from code that only receives the context.
//!
//! Run with: cargo run --example basic_usage

use ctxlog::prelude::*;

struct Connection {
    name: &'static str,
}

impl Close for Connection {
    type Error = String;

    fn close(&mut self) -> std::result::Result<(), String> {
        Err(format!("{} already closed by peer", self.name))
    }
}

fn handle_request(ctx: &Context, user: &str) {
    let ctx = ctxlog::with(ctx, &fields!["user" => user]);
    ctxlog::info(&ctx, "request accepted", &fields!["method" => "GET"]);

    let db = ctxlog::with_group(&ctx, "db");
    let db = ctxlog::with(&db, &fields!["host" => "localhost", "port" => 5432]);
    ctxlog::warn(&db, "slow query", &fields!["ms" => 1500]);

    let mut conn = Connection { name: "primary" };
    close_and_log_error(&ctx, &mut conn);
}

fn main() -> Result<()> {
    println!("=== ctxlog - Basic Usage Example ===\n");

    println!("1. Development output (colored text):");
    let ctx = ctxlog::new_context(None, LoggerConfig::development())?;
    ctxlog::debug(&ctx, "debug details", &[]);
    ctxlog::info!(&ctx, "server listening on port {}", 8080; "tls" => false);
    handle_request(&ctx, "ada");
    ctxlog::sync(&ctx)?;

    println!("\n2. Production output (JSON):");
    let config = LoggerConfig {
        name: "api".to_string(),
        level: LogLevel::Info,
        ..LoggerConfig::production()
    };
    let ctx = ctxlog::new_context(None, config)?;
    ctxlog::debug(&ctx, "hidden below INFO", &[]);
    handle_request(&ctx, "grace");
    ctxlog::sync(&ctx)?;

    println!("\n3. Configuration from CTXLOG_* environment variables:");
    let ctx = ctxlog::new_context(None, LoggerConfig::from_env()?)?;
    ctxlog::info(&ctx, "configured from environment", &[]);
    ctxlog::sync(&ctx)?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}

//! Basic logger usage example
//!
//! Demonstrates sources, level thresholds and per-source overrides on the
//! console.
//!
//! Run with: cargo run --example basic_usage

use logtic::prelude::*;
use logtic::{info, params, warn};

fn main() -> Result<()> {
    println!("=== logtic - Basic Usage Example ===\n");

    // Console only: the default file is the null device
    let logger = Logger::builder().level(LogLevel::Debug).open()?;
    let app = logger.connect("app");

    println!("1. Logging at different levels:");
    app.debug("This is a debug message");
    app.info("This is an info message");
    app.warn("This is a warning message");
    app.error("This is an error message");

    println!("\n2. Raising the threshold to WARN:");
    logger.set_level(LogLevel::Warn);
    app.debug("This debug message won't appear");
    app.info("This info message won't appear");
    app.warn("This warning will appear");

    println!("\n3. A source with its own level:");
    let mut chatty = logger.connect("chatty").with_level(LogLevel::Debug);
    chatty.debug("Overrides the logger threshold");
    chatty.clear_override();
    chatty.debug("Inherits WARN again, so this won't appear");

    println!("\n4. Formatting and parameters:");
    let port = 8080;
    warn!(app, "Listening on port {} without TLS", port);
    info!(app, "Hidden at WARN: {}", "formatting is skipped");
    app.pwarn("slow request", &params! { "path" => "/search", "ms" => 912 });

    println!("\n5. Control characters are escaped:");
    app.error("multi\nline\tmessage");

    println!("\n=== Example completed successfully ===");
    Ok(())
}

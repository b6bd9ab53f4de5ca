//! File logging example
//!
//! Demonstrates logging to both the console and a file, configured from JSON.
//!
//! Run with: cargo run --example file_logging

use logtic::prelude::*;
use logtic::format_bytes_binary;
use std::fs;

fn main() -> Result<()> {
    println!("=== logtic - File Logging Example ===\n");

    let config = LoggerConfig::from_json_str(
        r#"{
            "file_path": "application.log",
            "level": "info",
            "file_mode": "0640",
            "options": { "color": true, "escape_characters": true }
        }"#,
    )?;
    let logger = Logger::from_config(&config)?;
    logger.open()?;

    println!("1. Logging to both console and file:");
    let app = logger.connect("app");
    let db = logger.connect("db");

    app.info("Application started");
    app.debug("Loading configuration...");
    db.info("Connecting to database...");
    db.info("Database connection established");
    app.warn("Using default settings for some options");
    app.error("Failed to load optional plugin");

    println!("\n2. Performing some operations:");
    for i in 1..=5 {
        app.info(format_args!("Processing item {}/5", i));
        if i == 3 {
            app.warn("Item 3 took longer than expected");
        }
    }

    logger.close()?;

    let size = fs::metadata("application.log")
        .map_err(|e| LoggerError::io_operation("reading metadata", "application.log", e))?
        .len();
    println!(
        "\n3. Wrote {} lines, application.log is now {}",
        logger.metrics().lines_written(),
        format_bytes_binary(size)
    );

    println!("\n=== Example completed successfully ===");
    Ok(())
}

//! Log rotation example
//!
//! Several threads write while the main thread rotates the file. Every line
//! ends up in exactly one of the archives or the active file.
//!
//! Run with: cargo run --example rotation

use logtic::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== logtic - Rotation Example ===\n");

    let logger = Logger::builder()
        .file_path("rotation.log")
        .level(LogLevel::Info)
        .gzip_rotated_logs(true)
        .stdout(ConsoleStream::sink())
        .open()?;

    let workers: Vec<_> = (0..4)
        .map(|id| {
            let source = logger.connect(format!("worker-{}", id));
            thread::spawn(move || {
                for i in 0..250 {
                    source.info(format_args!("step {}", i));
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect();

    for _ in 0..3 {
        thread::sleep(Duration::from_millis(20));
        match logger.rotate()? {
            Some(rotated) => {
                println!("Archived to {}", rotated.path.display());
                if let Some(e) = rotated.compression_error {
                    println!("  (left uncompressed: {})", e);
                }
            }
            None => println!("Nothing to rotate"),
        }
    }

    for worker in workers {
        if worker.join().is_err() {
            eprintln!("A worker thread panicked");
        }
    }
    logger.close()?;

    let metrics = logger.metrics();
    println!(
        "\n{} lines written across {} rotations, {} dropped",
        metrics.lines_written(),
        metrics.rotations(),
        metrics.dropped_count()
    );

    println!("\n=== Example completed successfully ===");
    Ok(())
}

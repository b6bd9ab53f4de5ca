//! Integration tests for logtic
//!
//! These tests verify:
//! - Console and file line layout, including colors
//! - Silence before open and after close
//! - Per-source level overrides and live threshold changes
//! - Control character escaping
//! - Rotation naming and compression, including compression failures
//! - Write failures on the console and the file never escape
//! - Fatal and panic termination
//! - Configuration loading and the global logger

use chrono::Local;
use flate2::read::GzDecoder;
use logtic::prelude::*;
use logtic::{archive_path, params, string_from_parameters};
use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const FATAL_CHILD_ENV: &str = "LOGTIC_FATAL_CHILD_LOG";
const CLOSED_STDERR_CHILD_ENV: &str = "LOGTIC_CLOSED_STDERR_CHILD_DIR";

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Split a file line into its timestamp and the rest
fn split_stamp(line: &str) -> (&str, &str) {
    let (stamp, rest) = line.split_once(' ').expect("line without timestamp");
    assert!(
        chrono::DateTime::parse_from_rfc3339(stamp).is_ok(),
        "not an RFC 3339 timestamp: {}",
        stamp
    );
    (stamp, rest)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Make gzip fail for today's first archive of `log_file`
fn block_compression(log_file: &Path) -> PathBuf {
    let archive = archive_path(log_file, Local::now().date_naive()).unwrap();
    fs::create_dir(with_suffix(&archive, ".gz.tmp")).expect("Failed to create blocking dir");
    archive
}

struct FailingConsole;

impl Write for FailingConsole {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "console unavailable"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_warn_line_layout_with_color() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let out = MemoryStream::new();

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Debug)
        .stdout(out.clone())
        .open()
        .expect("Failed to open logger");

    logger.connect("svc").warn("Count 5");
    logger.close().expect("Failed to close logger");

    assert!(out
        .contents()
        .contains("\x1b[33m[WARN][svc]\x1b[0m Count 5"));

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    let (_, rest) = split_stamp(&lines[0]);
    assert_eq!(rest, "[WARN][svc] Count 5");
    assert!(!lines[0].contains('\x1b'), "file lines are never colored");
}

#[test]
fn test_never_opened_logger_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("never.log");
    let out = MemoryStream::new();
    let err = MemoryStream::new();

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Debug)
        .stdout(out.clone())
        .stderr(err.clone())
        .build();

    let source = logger.connect("x");
    source.debug("hi");
    source.error("hi");

    assert!(out.is_empty());
    assert!(err.is_empty());
    assert!(!log_file.exists());
}

#[test]
fn test_threshold_drops_verbose_events() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("threshold.log");
    let out = MemoryStream::new();

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .stdout(out.clone())
        .open()
        .expect("Failed to open logger");

    logger.connect("svc").debug("too verbose");
    logger.close().expect("Failed to close logger");

    assert!(out.is_empty());
    assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
}

#[test]
fn test_source_created_before_open_becomes_live() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("retro.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .stdout(ConsoleStream::sink())
        .build();
    let mut source = logger.connect("early");

    source.info("lost");
    logger.open().expect("Failed to open logger");
    source.info("kept");

    source.override_level(LogLevel::Error);
    source.info("filtered by override");
    logger.set_level(LogLevel::Debug);
    source.info("still filtered by override");
    source.clear_override();
    source.debug("inherits debug");

    logger.close().expect("Failed to close logger");

    let lines: Vec<String> = read_lines(&log_file)
        .iter()
        .map(|line| split_stamp(line).1.to_string())
        .collect();
    assert_eq!(lines, vec!["[INFO][early] kept", "[DEBUG][early] inherits debug"]);
}

#[test]
fn test_control_characters_escaped_in_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("escape.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .stdout(ConsoleStream::sink())
        .open()
        .expect("Failed to open logger");

    let malicious_message = "User login\n2024-10-17T00:00:00Z [ERROR][auth] Fake\tentry\r";
    logger.connect("auth").info(malicious_message);
    logger.close().expect("Failed to close logger");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(!content.trim_end_matches('\n').contains(['\n', '\r', '\t']));

    let (_, rest) = split_stamp(lines[0]);
    let message = rest.strip_prefix("[INFO][auth] ").unwrap();
    assert_eq!(logtic::unescape_control_characters(message), malicious_message);
}

#[test]
fn test_same_day_double_rotation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .stdout(ConsoleStream::sink())
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");

    source.info("first");
    let first = logger.rotate().unwrap().expect("rotation should happen");
    source.info("second");
    let second = logger.rotate().unwrap().expect("rotation should happen");
    source.info("third");
    logger.close().expect("Failed to close logger");

    let date = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    assert!(first.path.to_string_lossy().ends_with(&format!("app.log.{}", date)));
    assert_eq!(second.path, PathBuf::from(format!("{}-1", first.path.display())));

    assert!(read_lines(&first.path)[0].ends_with("[INFO][svc] first"));
    assert!(read_lines(&second.path)[0].ends_with("[INFO][svc] second"));
    assert!(read_lines(&log_file)[0].ends_with("[INFO][svc] third"));
    assert_eq!(logger.metrics().rotations(), 2);
}

#[test]
fn test_gzip_rotation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("zipped.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .gzip_rotated_logs(true)
        .stdout(ConsoleStream::sink())
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");

    source.info("archived");
    let first = logger.rotate().unwrap().expect("rotation should happen");
    assert!(first.is_compressed());
    assert!(first.compression_error.is_none());

    source.info("archived again");
    let second = logger.rotate().unwrap().expect("rotation should happen");
    assert!(second.is_compressed());
    assert_ne!(first.path, second.path, "compressed archives must not collide");

    let mut decoded = String::new();
    GzDecoder::new(File::open(&first.path).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();
    assert!(decoded.ends_with(" [INFO][svc] archived\n"));

    let uncompressed = first.path.with_extension("");
    assert!(!uncompressed.exists());
}

#[test]
fn test_gzip_failure_keeps_plain_archive() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("zipped.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .gzip_rotated_logs(true)
        .stdout(ConsoleStream::sink())
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");

    source.info("archived");
    let archive = block_compression(&log_file);

    let rotated = logger
        .rotate()
        .expect("compression failure must not fail the rotation")
        .expect("rotation should happen");
    assert!(rotated.compression_error.is_some());
    assert!(!rotated.is_compressed());
    assert_eq!(rotated.path, archive);
    assert!(!with_suffix(&archive, ".gz").exists());
    assert!(logger.is_open());
    assert_eq!(logger.metrics().rotations(), 1);

    source.info("after");
    logger.close().expect("Failed to close logger");

    let archived = read_lines(&archive);
    assert_eq!(archived.len(), 1);
    assert_eq!(split_stamp(&archived[0]).1, "[INFO][svc] archived");
    let active = read_lines(&log_file);
    assert_eq!(active.len(), 1);
    assert_eq!(split_stamp(&active[0]).1, "[INFO][svc] after");
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_failures_are_swallowed() {
    let logger = Logger::builder()
        .file_path("/dev/full")
        .level(LogLevel::Info)
        .stdout(ConsoleStream::writer(FailingConsole))
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.info("nowhere to go")));

    assert!(outcome.is_ok());
    assert!(logger.is_open());
    assert_eq!(logger.metrics().dropped_count(), 1);
    assert_eq!(logger.metrics().lines_written(), 0);
}

#[test]
fn test_console_failure_still_reaches_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .stdout(ConsoleStream::writer(FailingConsole))
        .stderr(ConsoleStream::writer(FailingConsole))
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");

    source.info("to file");
    source.error("also to file");
    logger.close().expect("Failed to close logger");

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 2);
    assert_eq!(split_stamp(&lines[1]).1, "[ERROR][svc] also to file");
    assert_eq!(logger.metrics().dropped_count(), 0);
}

/// Block until writes to our stderr fail because the reader went away
#[cfg(unix)]
fn wait_for_closed_stderr() {
    let deadline = Instant::now() + Duration::from_secs(10);
    while io::stderr().write_all(b".").is_ok() {
        assert!(Instant::now() < deadline, "stderr was never closed");
        thread::sleep(Duration::from_millis(10));
    }
}

/// Runs in the child process with stderr already closed
#[cfg(unix)]
fn rotate_with_closed_stderr(dir: &Path) {
    wait_for_closed_stderr();

    let log_file = dir.join("app.log");
    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .gzip_rotated_logs(true)
        .stdout(ConsoleStream::sink())
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");
    source.info("before rotation");
    block_compression(&log_file);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| logger.rotate()));
    let rotated = outcome
        .expect("rotation panicked")
        .expect("rotation failed")
        .expect("rotation should happen");
    assert!(rotated.compression_error.is_some());

    // Console diagnostics and error lines go to the closed stderr too
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        source.error("stderr is gone");

        #[cfg(target_os = "linux")]
        {
            let full = Logger::builder()
                .file_path("/dev/full")
                .stdout(ConsoleStream::sink())
                .open()
                .expect("Failed to open logger");
            full.connect("svc").error("dropped");
            full.reset();

            let full = Logger::builder()
                .file_path("/dev/full")
                .stdout(ConsoleStream::sink())
                .open()
                .expect("Failed to open logger");
            full.connect("svc").error("dropped");
            drop(full);
        }
    }));
    assert!(outcome.is_ok(), "logging panicked with stderr closed");
}

#[cfg(unix)]
#[test]
fn test_rotation_survives_closed_stderr() {
    if let Ok(dir) = env::var(CLOSED_STDERR_CHILD_ENV) {
        rotate_with_closed_stderr(Path::new(&dir));
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut child = Command::new(env::current_exe().unwrap())
        .args(["test_rotation_survives_closed_stderr", "--exact", "--nocapture"])
        .env(CLOSED_STDERR_CHILD_ENV, temp_dir.path())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run child test process");
    drop(child.stderr.take());

    let status = child.wait().expect("Failed to wait for child test process");
    assert!(status.success(), "child failed with {:?}", status);

    let today = Local::now().format("%Y-%m-%d");
    let archive = temp_dir.path().join(format!("app.log.{}", today));
    let archived = read_lines(&archive);
    assert_eq!(split_stamp(&archived[0]).1, "[INFO][svc] before rotation");
    assert!(temp_dir.path().join("app.log").exists());
}

#[test]
fn test_close_then_reopen_appends() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("reopen.log");

    let logger = Logger::builder()
        .file_path(&log_file)
        .level(LogLevel::Info)
        .stdout(ConsoleStream::sink())
        .build();
    let source = logger.connect("svc");

    logger.open().unwrap();
    source.info("one");
    logger.close().unwrap();
    source.info("while closed");
    logger.open().unwrap();
    source.info("two");
    logger.close().unwrap();

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("one"));
    assert!(lines[1].ends_with("two"));
}

#[test]
fn test_fatal_exits_with_status_one() {
    if let Ok(path) = env::var(FATAL_CHILD_ENV) {
        let logger = Logger::builder()
            .file_path(path)
            .color(false)
            .stderr(ConsoleStream::sink())
            .open()
            .expect("Failed to open logger");
        logger
            .connect("worker")
            .pfatal("cannot continue", &params! { "reason" => "disk full" });
    }

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("fatal.log");

    let status = Command::new(env::current_exe().unwrap())
        .args(["test_fatal_exits_with_status_one", "--exact", "--nocapture"])
        .env(FATAL_CHILD_ENV, &log_file)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("Failed to run child test process");

    assert_eq!(status.code(), Some(1));
    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert_eq!(
        split_stamp(&lines[0]).1,
        "[FATAL][worker] cannot continue: reason='disk full'"
    );
}

#[test]
fn test_panic_is_catchable_and_logged() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("panic.log");
    let err = MemoryStream::new();

    let logger = Logger::builder()
        .file_path(&log_file)
        .color(false)
        .stderr(err.clone())
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("core");

    let payload = panic::catch_unwind(AssertUnwindSafe(|| source.panic("invariant broken")))
        .expect_err("panic should unwind");
    assert_eq!(
        payload.downcast_ref::<String>().map(String::as_str),
        Some("invariant broken")
    );

    assert_eq!(err.contents(), "[FATAL][core] invariant broken\n");
    let lines = read_lines(&log_file);
    assert_eq!(split_stamp(&lines[0]).1, "[FATAL][core] invariant broken");
}

#[test]
fn test_unknown_level_is_noop() {
    let out = MemoryStream::new();
    let logger = Logger::builder()
        .level(LogLevel::Debug)
        .color(false)
        .stdout(out.clone())
        .open()
        .expect("Failed to open logger");
    let source = logger.connect("svc");

    source.write(17, "nope");
    source.write("verbose", "nope");
    source.write(1, "yes");

    assert_eq!(out.contents(), "[WARN][svc] yes\n");
}

#[test]
fn test_parameterized_events() {
    let out = MemoryStream::new();
    let logger = Logger::builder()
        .level(LogLevel::Info)
        .color(false)
        .stdout(out.clone())
        .open()
        .expect("Failed to open logger");

    let params = params! {
        "user" => "alice",
        "attempt" => 2,
        "admin" => false,
        "digest" => vec![0xca_u8, 0xfe],
    };
    logger.connect("auth").pinfo("login", &params);

    assert_eq!(
        string_from_parameters(&params),
        "admin='false' attempt=2 digest=cafe user='alice'"
    );
    assert_eq!(
        out.contents(),
        "[INFO][auth] login: admin='false' attempt=2 digest=cafe user='alice'\n"
    );
}

#[test]
fn test_config_file_drives_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("configured.log");
    let config_file = temp_dir.path().join("logtic.json");

    let document = serde_json::json!({
        "file_path": log_file,
        "level": "warn",
        "file_mode": "0600",
        "options": { "color": false }
    });
    fs::write(&config_file, document.to_string()).unwrap();

    let config = LoggerConfig::from_json_file(&config_file).expect("Failed to load config");
    let logger = Logger::from_config(&config).expect("Failed to apply config");
    logger.set_stdout(ConsoleStream::sink());
    logger.open().expect("Failed to open logger");

    let source = logger.connect("cfg");
    source.info("filtered");
    source.warn("kept");
    logger.close().unwrap();

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert_eq!(split_stamp(&lines[0]).1, "[WARN][cfg] kept");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&log_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_global_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("global.log");
    let out = MemoryStream::new();

    let global = logtic::global();
    global.reset();
    global.set_file_path(&log_file);
    global.set_level(LogLevel::Info);
    global.set_color(false);
    global.set_stdout(out.clone());
    global.open().expect("Failed to open global logger");

    logtic::connect("main").info("from global");
    assert_eq!(out.contents(), "[INFO][main] from global\n");

    global.reset();
    assert!(!global.is_open());
    assert_eq!(global.level(), LogLevel::Error);
    assert_eq!(global.file_path(), PathBuf::from(logtic::NULL_DEVICE));

    logtic::connect("main").error("after reset");
    assert_eq!(read_lines(&log_file).len(), 1);
}

#[test]
fn test_invalid_mode_rejected_at_open() {
    let logger = Logger::builder().file_mode(0o70000).build();
    let err = logger.open().unwrap_err();
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    assert!(!logger.is_open());
}

//! Main logger implementation
//!
//! A [`Logger`] is a cheap, clonable handle to shared state: the open file,
//! the threshold, and the output settings. Every clone refers to the same
//! logger, so handles can be passed freely between threads.

use super::config::{
    is_null_device, validate_file_settings, LoggerConfig, LoggerOptions, DEFAULT_FILE_MODE,
    NULL_DEVICE,
};
use super::error::{LoggerError, Result};
use super::format::{self, escape_control_characters, Tag};
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use super::source::Source;
use super::timestamp;
use crate::appenders::console::{self, AnsiPalette, ConsoleStream, Palette};
use crate::appenders::file::LogFile;
use crate::appenders::rotating_file::{self, RotatedFile};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

/// Runtime settings, including the parts that cannot be serialized
#[derive(Clone)]
struct Settings {
    file_path: PathBuf,
    file_mode: u32,
    options: LoggerOptions,
    palette: Arc<dyn Palette>,
    stdout: ConsoleStream,
    stderr: ConsoleStream,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(NULL_DEVICE),
            file_mode: DEFAULT_FILE_MODE,
            options: LoggerOptions::default(),
            palette: Arc::new(AnsiPalette),
            stdout: ConsoleStream::Stdout,
            stderr: ConsoleStream::Stderr,
        }
    }
}

struct LoggerInner {
    level: AtomicU8,
    /// Mirrors `file.is_some()` so writers can bail out without the lock
    opened: AtomicBool,
    settings: RwLock<Settings>,
    /// Serializes every append and the whole rotation sequence
    file: Mutex<Option<LogFile>>,
    metrics: LoggerMetrics,
    console_failures: AtomicU64,
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.get_mut().take() {
            let _ = file.sync();
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            report(format_args!(
                "[LOGGER WARNING] Logger shutting down with {} dropped lines (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            ));
        }
    }
}

/// Owns one log file and the configuration shared by its sources
///
/// # Example
///
/// ```
/// use logtic::{Logger, LogLevel};
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = Logger::builder()
///     .file_path(dir.path().join("app.log"))
///     .level(LogLevel::Info)
///     .stdout(logtic::ConsoleStream::sink())
///     .open()
///     .unwrap();
///
/// logger.connect("db").info("connected");
/// logger.close().unwrap();
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Logger with default settings: level `Error`, null device, mode `0644`
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(LogLevel::Error, Settings::default())
    }

    fn with_settings(level: LogLevel, settings: Settings) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                level: AtomicU8::new(level.as_u8()),
                opened: AtomicBool::new(false),
                settings: RwLock::new(settings),
                file: Mutex::new(None),
                metrics: LoggerMetrics::new(),
                console_failures: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Validated logger built from a configuration document
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let logger = Self::new();
        logger.apply_config(config)?;
        Ok(logger)
    }

    /// Replace the serializable settings
    ///
    /// The palette and console streams are kept. A new path or mode only
    /// takes effect at the next [`open`](Self::open).
    pub fn apply_config(&self, config: &LoggerConfig) -> Result<()> {
        config.validate()?;

        let mut settings = self.inner.settings.write();
        settings.file_path = config.file_path.clone();
        settings.file_mode = config.file_mode;
        settings.options = config.options;
        self.set_level(config.level);
        Ok(())
    }

    /// Snapshot of the serializable settings
    pub fn config(&self) -> LoggerConfig {
        let settings = self.inner.settings.read();
        LoggerConfig {
            file_path: settings.file_path.clone(),
            level: self.level(),
            file_mode: settings.file_mode,
            options: settings.options,
        }
    }

    /// Open the log file
    ///
    /// Creates the file with the configured mode, or appends to it if it
    /// exists. Calling this on an open logger does nothing.
    pub fn open(&self) -> Result<()> {
        let mut file = self.inner.file.lock();
        if file.is_some() {
            return Ok(());
        }

        let (path, mode) = {
            let settings = self.inner.settings.read();
            (settings.file_path.clone(), settings.file_mode)
        };
        validate_file_settings(&path, mode)?;

        *file = Some(LogFile::open(&path, mode)?);
        self.inner.opened.store(true, Ordering::Release);
        Ok(())
    }

    /// Flush and release the log file
    ///
    /// The handle is released even when the flush fails. Closing a logger
    /// that is not open does nothing.
    pub fn close(&self) -> Result<()> {
        let closed = {
            let mut file = self.inner.file.lock();
            self.inner.opened.store(false, Ordering::Release);
            file.take()
        };

        match closed {
            Some(file) => sync_and_release(file),
            None => Ok(()),
        }
    }

    /// Close the file and restore every setting to its default
    pub fn reset(&self) {
        let closed = {
            let mut file = self.inner.file.lock();
            *self.inner.settings.write() = Settings::default();
            self.set_level(LogLevel::Error);
            self.inner.opened.store(false, Ordering::Release);
            file.take()
        };
        self.inner.metrics.reset();
        self.inner.console_failures.store(0, Ordering::Relaxed);

        if let Some(file) = closed {
            if let Err(e) = sync_and_release(file) {
                report(format_args!(
                    "[LOGGER WARNING] Failed to flush log file during reset: {}",
                    e
                ));
            }
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.inner.opened.load(Ordering::Acquire)
    }

    /// Named source bound to this logger
    pub fn connect(&self, name: impl Into<String>) -> Source {
        Source::new(self, name)
    }

    /// Archive the current file and start a fresh one at the same path
    ///
    /// Writers block for the duration, so no line is lost or split between
    /// the two files. Returns `Ok(None)` when no file is open or the logger
    /// writes to the null device.
    ///
    /// If the old file was closed but a later step failed, the logger is left
    /// closed and the error is returned.
    pub fn rotate(&self) -> Result<Option<RotatedFile>> {
        let mut file = self.inner.file.lock();
        let (mode, compress) = {
            let settings = self.inner.settings.read();
            (settings.file_mode, settings.options.gzip_rotated_logs)
        };

        let result = rotating_file::rotate(&mut file, mode, compress, timestamp::today());
        self.inner.opened.store(file.is_some(), Ordering::Release);

        if let Ok(Some(_)) = &result {
            self.inner.metrics.record_rotation();
        }
        result
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.inner.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Takes effect for every source without an override, including writes
    /// already racing with this call
    #[inline]
    pub fn set_level(&self, level: LogLevel) {
        self.inner.level.store(level.as_u8(), Ordering::Relaxed);
    }

    pub fn file_path(&self) -> PathBuf {
        self.inner.settings.read().file_path.clone()
    }

    /// Used by the next [`open`](Self::open)
    pub fn set_file_path(&self, path: impl Into<PathBuf>) {
        self.inner.settings.write().file_path = path.into();
    }

    pub fn file_mode(&self) -> u32 {
        self.inner.settings.read().file_mode
    }

    /// Permission bits for newly created files (checked at open)
    pub fn set_file_mode(&self, mode: u32) {
        self.inner.settings.write().file_mode = mode;
    }

    pub fn options(&self) -> LoggerOptions {
        self.inner.settings.read().options
    }

    pub fn set_options(&self, options: LoggerOptions) {
        self.inner.settings.write().options = options;
    }

    pub fn color(&self) -> bool {
        self.options().color
    }

    pub fn set_color(&self, enabled: bool) {
        self.inner.settings.write().options.color = enabled;
    }

    pub fn escape_characters(&self) -> bool {
        self.options().escape_characters
    }

    pub fn set_escape_characters(&self, enabled: bool) {
        self.inner.settings.write().options.escape_characters = enabled;
    }

    pub fn gzip_rotated_logs(&self) -> bool {
        self.options().gzip_rotated_logs
    }

    pub fn set_gzip_rotated_logs(&self, enabled: bool) {
        self.inner.settings.write().options.gzip_rotated_logs = enabled;
    }

    pub fn palette(&self) -> Arc<dyn Palette> {
        Arc::clone(&self.inner.settings.read().palette)
    }

    pub fn set_palette(&self, palette: impl Palette + 'static) {
        self.inner.settings.write().palette = Arc::new(palette);
    }

    pub fn stdout(&self) -> ConsoleStream {
        self.inner.settings.read().stdout.clone()
    }

    /// Target for debug, info and warn lines
    pub fn set_stdout(&self, stream: impl Into<ConsoleStream>) {
        self.inner.settings.write().stdout = stream.into();
    }

    pub fn stderr(&self) -> ConsoleStream {
        self.inner.settings.read().stderr.clone()
    }

    /// Target for error and fatal lines
    pub fn set_stderr(&self, stream: impl Into<ConsoleStream>) {
        self.inner.settings.write().stderr = stream.into();
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use logtic::Logger;
    ///
    /// let logger = Logger::new();
    /// let metrics = logger.metrics();
    /// println!("Written: {}", metrics.lines_written());
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    /// Write one event to the console and the file
    ///
    /// Filtering has already happened. Panics raised by a custom stream or
    /// palette are caught and reported here.
    pub(crate) fn emit(&self, tag: Tag, source: &str, message: &str) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.emit_unguarded(tag, source, message)
        }));

        if let Err(payload) = outcome {
            report(format_args!(
                "[LOGGER ERROR] Panic while writing a line for source '{}': {}",
                source,
                panic_message(&*payload)
            ));
        }
    }

    fn emit_unguarded(&self, tag: Tag, source: &str, message: &str) {
        let (options, palette, stream) = {
            let settings = self.inner.settings.read();
            let stream = if tag.uses_stderr() {
                settings.stderr.clone()
            } else {
                settings.stdout.clone()
            };
            (settings.options, Arc::clone(&settings.palette), stream)
        };

        let message = if options.escape_characters {
            escape_control_characters(message)
        } else {
            Cow::Borrowed(message)
        };

        let prefix = format::prefix(tag.label(), source);
        let console_prefix = if options.color {
            Cow::Owned(console::paint(&*palette, tag, &prefix))
        } else {
            Cow::Borrowed(prefix.as_str())
        };

        if let Err(e) = stream.write_line(&format::console_line(&console_prefix, &message)) {
            let failures = self.inner.console_failures.fetch_add(1, Ordering::Relaxed);
            if should_alert(failures) {
                report(format_args!(
                    "[LOGGER WARNING] Console write failed ({} failures so far): {}",
                    failures + 1,
                    e
                ));
            }
        }

        let mut text = prefix;
        text.push(' ');
        text.push_str(&message);
        self.append_line(&text);
    }

    /// Append `<timestamp> <text>` to the file in a single write
    ///
    /// Does nothing when no file is open. Failures are counted and reported,
    /// never returned.
    pub(crate) fn append_line(&self, text: &str) {
        let mut file = self.inner.file.lock();
        let Some(log_file) = file.as_mut() else {
            return;
        };

        let line = format::file_line(&timestamp::line_timestamp(), text);
        match log_file.append(&line) {
            Ok(()) => {
                self.inner.metrics.record_written();
            }
            Err(e) => {
                let dropped = self.inner.metrics.record_dropped();
                if should_alert(dropped) {
                    report(format_args!(
                        "[LOGGER ERROR] Failed to write to {}: {}. {} lines dropped.",
                        log_file.path().display(),
                        e,
                        dropped + 1
                    ));
                }
            }
        }
    }

    /// Push the file to disk before the process terminates
    pub(crate) fn sync_file(&self) {
        let mut file = self.inner.file.lock();
        if let Some(log_file) = file.as_mut() {
            if let Err(e) = log_file.sync() {
                if !is_null_device(log_file.path()) {
                    report(format_args!(
                        "[LOGGER WARNING] Failed to sync {}: {}",
                        log_file.path().display(),
                        e
                    ));
                }
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.inner.settings.read();
        let mode = format!("{:04o}", settings.file_mode);
        f.debug_struct("Logger")
            .field("file_path", &settings.file_path)
            .field("level", &self.level())
            .field("file_mode", &mode)
            .field("options", &settings.options)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

fn sync_and_release(mut file: LogFile) -> Result<()> {
    // fsync is not supported on every null device
    if is_null_device(file.path()) {
        return Ok(());
    }
    file.sync()
        .map_err(|e| LoggerError::io_operation("flushing log file", file.path(), e))
}

/// Alert on first failure and periodically thereafter
fn should_alert(previous_failures: u64) -> bool {
    previous_failures == 0 || (previous_failures + 1) % 1000 == 0
}

/// Best-effort diagnostic; unlike `eprintln!` this never panics
pub(crate) fn report(args: fmt::Arguments<'_>) {
    let mut err = io::stderr().lock();
    let _ = err.write_fmt(args);
    let _ = err.write_all(b"\n");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use logtic::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .color(false)
///     .gzip_rotated_logs(true)
///     .build();
/// assert!(!logger.is_open());
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    palette: Option<Arc<dyn Palette>>,
    stdout: ConsoleStream,
    stderr: ConsoleStream,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            palette: None,
            stdout: ConsoleStream::Stdout,
            stderr: ConsoleStream::Stderr,
        }
    }

    /// Start from a configuration document
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.file_path = path.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.config.file_mode = mode;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn options(mut self, options: LoggerOptions) -> Self {
        self.config.options = options;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn color(mut self, enabled: bool) -> Self {
        self.config.options.color = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn escape_characters(mut self, enabled: bool) -> Self {
        self.config.options.escape_characters = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn gzip_rotated_logs(mut self, enabled: bool) -> Self {
        self.config.options.gzip_rotated_logs = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn palette(mut self, palette: impl Palette + 'static) -> Self {
        self.palette = Some(Arc::new(palette));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stdout(mut self, stream: impl Into<ConsoleStream>) -> Self {
        self.stdout = stream.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stderr(mut self, stream: impl Into<ConsoleStream>) -> Self {
        self.stderr = stream.into();
        self
    }

    /// Build the Logger without opening it
    ///
    /// Settings are validated when the logger is opened.
    pub fn build(self) -> Logger {
        let settings = Settings {
            file_path: self.config.file_path,
            file_mode: self.config.file_mode,
            options: self.config.options,
            palette: self.palette.unwrap_or_else(|| Arc::new(AnsiPalette)),
            stdout: self.stdout,
            stderr: self.stderr,
        };
        Logger::with_settings(self.config.level, settings)
    }

    /// Build the Logger and open its file
    pub fn open(self) -> Result<Logger> {
        let logger = self.build();
        logger.open()?;
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger, created with default settings on first use
///
/// Use [`Logger::reset`] to return it to its initial state.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(Logger::new)
}

/// Connect a source to the process-wide logger
pub fn connect(name: impl Into<String>) -> Source {
    global().connect(name)
}

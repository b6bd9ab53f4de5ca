//! Named sources
//!
//! A [`Source`] is how one component writes to a [`Logger`]. It carries a
//! name, shown verbatim in every line, and an optional level override. All
//! writes are synchronous: when a call returns, its line has been handed to
//! the console and appended to the file.

use super::format::Tag;
use super::log_level::{admits, LogLevel};
use super::logger::Logger;
use super::params::Params;
use std::fmt;
use std::io::{self, Write};
use std::process;

/// Longest partial line a [`SourceWriter`] buffers before logging it
pub const MAX_PENDING_LINE: usize = 64 * 1024;

/// Named handle for writing events through a [`Logger`]
///
/// Sources are cheap to clone. A default source is bound to no logger and
/// silently discards everything.
///
/// ```
/// use logtic::{Logger, LogLevel, MemoryStream};
///
/// let out = MemoryStream::new();
/// let logger = Logger::builder().level(LogLevel::Warn).color(false).stdout(out.clone()).build();
/// logger.open().unwrap();
///
/// let mut source = logger.connect("cache");
/// source.info("not shown");
/// source.override_level(LogLevel::Debug);
/// source.info("shown");
///
/// assert_eq!(out.contents(), "[INFO][cache] shown\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Source {
    name: String,
    level: Option<LogLevel>,
    logger: Option<Logger>,
}

impl Source {
    /// Bind a source to `logger`; the logger does not need to be open yet
    pub fn new(logger: &Logger, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            logger: Some(logger.clone()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn level_override(&self) -> Option<LogLevel> {
        self.level
    }

    /// Use `level` instead of the logger's threshold for later writes
    pub fn override_level(&mut self, level: LogLevel) {
        self.level = Some(level);
    }

    /// Inherit the logger's threshold again
    pub fn clear_override(&mut self) {
        self.level = None;
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Threshold applied to the next write
    pub fn effective_level(&self) -> LogLevel {
        self.level
            .or_else(|| self.logger.as_ref().map(Logger::level))
            .unwrap_or_default()
    }

    /// Whether a write at `level` would produce output right now
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.enabled_logger(level).is_some()
    }

    fn enabled_logger(&self, level: LogLevel) -> Option<&Logger> {
        let logger = self.logger.as_ref()?;
        let threshold = self.level.unwrap_or_else(|| logger.level());
        if admits(threshold, level) && logger.is_open() {
            Some(logger)
        } else {
            None
        }
    }

    /// Write `message` at `level`
    ///
    /// The message is only formatted once the level check has passed.
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if let Some(logger) = self.enabled_logger(level) {
            logger.emit(Tag::Level(level), &self.name, &message.to_string());
        }
    }

    #[inline]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    /// Write at a level given as a [`LogLevel`], a level name or an integer
    ///
    /// Values that do not name a level are ignored.
    ///
    /// ```
    /// # let logger = logtic::Logger::new();
    /// let source = logger.connect("svc");
    /// source.write(2, "info by number");
    /// source.write(42, "dropped");
    /// ```
    pub fn write<L: TryInto<LogLevel>>(&self, level: L, message: impl fmt::Display) {
        if let Ok(level) = level.try_into() {
            self.log(level, message);
        }
    }

    /// Log at FATAL regardless of level, then exit the process with status 1
    ///
    /// The line goes to stderr and to the file if one is open; the file is
    /// synced before exiting.
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.emit_terminal(&message.to_string());
        process::exit(1)
    }

    /// Log at FATAL regardless of level, then panic with the message
    ///
    /// The panic payload is the message as a `String`, so it can be recovered
    /// with [`std::panic::catch_unwind`].
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        let message = message.to_string();
        self.emit_terminal(&message);
        std::panic::panic_any(message)
    }

    fn emit_terminal(&self, message: &str) {
        if let Some(logger) = &self.logger {
            logger.emit(Tag::Fatal, &self.name, message);
            logger.sync_file();
        }
    }

    /// Write `"<event>: <params>"` at `level`
    ///
    /// ```
    /// use logtic::{params, Logger, LogLevel, MemoryStream};
    ///
    /// let out = MemoryStream::new();
    /// let logger = Logger::builder().level(LogLevel::Info).color(false).stdout(out.clone()).build();
    /// logger.open().unwrap();
    ///
    /// logger.connect("http").pinfo("request", &params! { "status" => 200, "path" => "/" });
    /// assert_eq!(out.contents(), "[INFO][http] request: path='/' status=200\n");
    /// ```
    pub fn plog(&self, level: LogLevel, event: impl fmt::Display, params: &Params) {
        self.log(level, WithParams { event, params });
    }

    pub fn pdebug(&self, event: impl fmt::Display, params: &Params) {
        self.plog(LogLevel::Debug, event, params);
    }

    pub fn pinfo(&self, event: impl fmt::Display, params: &Params) {
        self.plog(LogLevel::Info, event, params);
    }

    pub fn pwarn(&self, event: impl fmt::Display, params: &Params) {
        self.plog(LogLevel::Warn, event, params);
    }

    pub fn perror(&self, event: impl fmt::Display, params: &Params) {
        self.plog(LogLevel::Error, event, params);
    }

    pub fn pwrite<L: TryInto<LogLevel>>(
        &self,
        level: L,
        event: impl fmt::Display,
        params: &Params,
    ) {
        if let Ok(level) = level.try_into() {
            self.plog(level, event, params);
        }
    }

    pub fn pfatal(&self, event: impl fmt::Display, params: &Params) -> ! {
        self.fatal(WithParams { event, params })
    }

    pub fn ppanic(&self, event: impl fmt::Display, params: &Params) -> ! {
        self.panic(WithParams { event, params })
    }

    /// `io::Write` adapter that logs each written line at `level`
    ///
    /// Useful for handing a source to code that only knows how to write to a
    /// stream.
    pub fn writer(&self, level: LogLevel) -> SourceWriter {
        SourceWriter {
            source: self.clone(),
            level,
            pending: Vec::new(),
        }
    }
}

struct WithParams<'a, E> {
    event: E,
    params: &'a Params,
}

impl<E: fmt::Display> fmt::Display for WithParams<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.event, self.params)
    }
}

/// Line-oriented writer returned by [`Source::writer`]
///
/// Each `\n`-terminated line becomes one event with the terminator (and a
/// preceding `\r`) removed. A trailing partial line is logged on `flush` or
/// when the writer is dropped. Input without line breaks is logged in chunks
/// of [`MAX_PENDING_LINE`] bytes. Invalid UTF-8 is replaced.
#[derive(Debug)]
pub struct SourceWriter {
    source: Source,
    level: LogLevel,
    pending: Vec<u8>,
}

impl SourceWriter {
    fn emit(&self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        self.source.log(self.level, String::from_utf8_lossy(line));
    }
}

impl Write for SourceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.emit(&line[..end]);
        }
        while self.pending.len() >= MAX_PENDING_LINE {
            let chunk: Vec<u8> = self.pending.drain(..MAX_PENDING_LINE).collect();
            self.emit(&chunk);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
        Ok(())
    }
}

impl Drop for SourceWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

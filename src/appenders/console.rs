//! Console output: stream targets and prefix coloring

use crate::core::format::Tag;
use crate::core::LogLevel;
use colored::Color;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Applies colors to console prefixes
///
/// The default [`AnsiPalette`] emits ANSI escape codes. Platforms whose
/// consoles don't understand those can install their own palette with
/// [`Logger::set_palette`](crate::Logger::set_palette).
pub trait Palette: Send + Sync {
    /// Gray, used for debug events
    fn dim(&self, text: &str) -> String;
    /// Used for info events
    fn blue(&self, text: &str) -> String;
    /// Used for warnings
    fn yellow(&self, text: &str) -> String;
    /// Used for errors and fatal events
    fn red(&self, text: &str) -> String;
}

/// ANSI foreground colors, always applied
///
/// Unlike `colored`'s `Colorize`, this does not consult the terminal or the
/// `NO_COLOR` family of variables; whether to color at all is decided by the
/// logger's `color` option.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiPalette;

impl AnsiPalette {
    fn paint(color: Color, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), text)
    }
}

impl Palette for AnsiPalette {
    fn dim(&self, text: &str) -> String {
        Self::paint(Color::BrightBlack, text)
    }

    fn blue(&self, text: &str) -> String {
        Self::paint(Color::Blue, text)
    }

    fn yellow(&self, text: &str) -> String {
        Self::paint(Color::Yellow, text)
    }

    fn red(&self, text: &str) -> String {
        Self::paint(Color::Red, text)
    }
}

pub(crate) fn paint(palette: &dyn Palette, tag: Tag, text: &str) -> String {
    match tag {
        Tag::Level(LogLevel::Debug) => palette.dim(text),
        Tag::Level(LogLevel::Info) => palette.blue(text),
        Tag::Level(LogLevel::Warn) => palette.yellow(text),
        Tag::Level(LogLevel::Error) | Tag::Fatal => palette.red(text),
    }
}

/// Where console lines go
///
/// Each line is written with a single `write_all` while the stream is locked,
/// so lines from concurrent threads never interleave.
#[derive(Clone, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
    Writer(Arc<Mutex<dyn Write + Send>>),
}

impl ConsoleStream {
    /// Send console lines to any writer
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        ConsoleStream::Writer(Arc::new(Mutex::new(writer)))
    }

    /// Discard console output
    pub fn sink() -> Self {
        Self::writer(io::sink())
    }

    pub(crate) fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            ConsoleStream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            ConsoleStream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(line.as_bytes())?;
                err.flush()
            }
            ConsoleStream::Writer(writer) => {
                let mut writer = writer.lock();
                writer.write_all(line.as_bytes())?;
                writer.flush()
            }
        }
    }
}

impl fmt::Debug for ConsoleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleStream::Stdout => f.write_str("Stdout"),
            ConsoleStream::Stderr => f.write_str("Stderr"),
            ConsoleStream::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl From<MemoryStream> for ConsoleStream {
    fn from(stream: MemoryStream) -> Self {
        ConsoleStream::writer(stream)
    }
}

/// Shared in-memory buffer that captures console output
///
/// Clones share the same buffer, so one clone can be handed to a logger and
/// another kept for inspection.
///
/// ```
/// use logtic::{Logger, LogLevel, MemoryStream};
///
/// let out = MemoryStream::new();
/// let logger = Logger::builder()
///     .level(LogLevel::Info)
///     .color(false)
///     .stdout(out.clone())
///     .build();
/// logger.open().unwrap();
///
/// logger.connect("app").info("ready");
/// assert_eq!(out.contents(), "[INFO][app] ready\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured output, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

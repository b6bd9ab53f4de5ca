//! # logtic
//!
//! Leveled logging for processes whose components share one log file.
//!
//! A [`Logger`] owns the file and its settings; each component connects a
//! named [`Source`] and writes through it. Lines go to the console as
//! `[LEVEL][source] message` and to the file with an RFC 3339 timestamp in
//! front. Any thread may rotate the file while others are writing without a
//! line being lost or split.
//!
//! ## Features
//!
//! - **Synchronous**: a write has reached the console and the file when it
//!   returns
//! - **Per-source levels**: a source can override its logger's threshold
//! - **Safe rotation**: dated archives, optional gzip, no lost lines
//! - **Thread Safe**: loggers and sources are cheap to clone and share
//!
//! ## Example
//!
//! ```
//! use logtic::prelude::*;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::builder()
//!     .file_path(dir.path().join("app.log"))
//!     .level(LogLevel::Info)
//!     .stdout(ConsoleStream::sink())
//!     .open()
//!     .unwrap();
//!
//! let db = logger.connect("db");
//! logtic::info!(db, "pool ready with {} connections", 8);
//! db.debug("filtered out");
//!
//! logger.rotate().unwrap();
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleStream, MemoryStream, Palette, RotatedFile};
    pub use crate::core::{
        LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
        LoggerOptions, ParamValue, Params, Result, Source, SourceWriter,
    };
}

pub use appenders::{archive_path, AnsiPalette, ConsoleStream, MemoryStream, Palette, RotatedFile};
pub use core::{
    admits, connect, escape_control_characters, format_bytes_binary, format_bytes_decimal,
    format_line_timestamp, global, line_timestamp, string_from_parameters,
    unescape_control_characters, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, LoggerOptions, ParamValue, Params, Result, Source, SourceWriter,
    DEFAULT_FILE_MODE, NULL_DEVICE,
};

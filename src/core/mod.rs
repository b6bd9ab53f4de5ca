//! Core logger types

pub mod config;
pub mod error;
pub(crate) mod format;
pub mod humanize;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod params;
pub mod source;
pub mod timestamp;

pub use config::{LoggerConfig, LoggerOptions, DEFAULT_FILE_MODE, NULL_DEVICE};
pub use error::{LoggerError, Result};
pub use format::{escape_control_characters, unescape_control_characters};
pub use humanize::{format_bytes_binary, format_bytes_decimal};
pub use log_level::{admits, LogLevel};
pub use logger::{connect, global, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use params::{string_from_parameters, ParamValue, Params};
pub use source::{Source, SourceWriter};
pub use timestamp::{format_line_timestamp, line_timestamp};

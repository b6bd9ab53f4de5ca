//! Logger configuration
//!
//! [`LoggerConfig`] is the serializable part of a logger's settings. Every
//! field has a default, so a configuration document only needs to name what it
//! changes:
//!
//! ```
//! use logtic::{LoggerConfig, LogLevel};
//!
//! let config = LoggerConfig::from_json_str(r#"{ "file_path": "app.log", "level": "info" }"#).unwrap();
//! assert_eq!(config.level, LogLevel::Info);
//! assert_eq!(config.file_mode, 0o644);
//! assert!(config.options.escape_characters);
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Platform path that discards everything written to it
#[cfg(windows)]
pub const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_DEVICE: &str = "/dev/null";

pub const DEFAULT_FILE_MODE: u32 = 0o644;

const MAX_FILE_MODE: u32 = 0o7777;

/// Output options for a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Colorize the `[LEVEL][source]` prefix on the console
    pub color: bool,
    /// Replace control characters in messages with their escape sequences
    pub escape_characters: bool,
    /// Gzip archives after rotation
    pub gzip_rotated_logs: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            color: true,
            escape_characters: true,
            gzip_rotated_logs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub file_path: PathBuf,
    pub level: LogLevel,
    #[serde(serialize_with = "serialize_mode", deserialize_with = "deserialize_mode")]
    pub file_mode: u32,
    pub options: LoggerOptions,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(NULL_DEVICE),
            level: LogLevel::Error,
            file_mode: DEFAULT_FILE_MODE,
            options: LoggerOptions::default(),
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_options(mut self, options: LoggerOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| LoggerError::io_operation("reading configuration", path, e))?;
        Self::from_json_str(&json)
    }

    /// Check the settings that can only be rejected before the file is opened
    pub fn validate(&self) -> Result<()> {
        validate_file_settings(&self.file_path, self.file_mode)
    }

    /// True when the configured path is the platform null device
    pub fn is_null_device(&self) -> bool {
        is_null_device(&self.file_path)
    }
}

pub(crate) fn validate_file_settings(path: &Path, mode: u32) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(LoggerError::config("Logger", "file path is empty"));
    }
    if mode > MAX_FILE_MODE {
        return Err(LoggerError::config(
            "Logger",
            format!("file mode {:#o} is out of range (max {:#o})", mode, MAX_FILE_MODE),
        ));
    }
    Ok(())
}

pub(crate) fn is_null_device(path: &Path) -> bool {
    path == Path::new(NULL_DEVICE)
}

fn serialize_mode<S: Serializer>(
    mode: &u32,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:04o}", mode))
}

/// Accepts either a number or an octal string such as `"0640"`
fn deserialize_mode<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Mode {
        Number(u32),
        Octal(String),
    }

    match Mode::deserialize(deserializer)? {
        Mode::Number(n) => Ok(n),
        Mode::Octal(s) => {
            let digits = s.trim_start_matches("0o");
            u32::from_str_radix(digits, 8)
                .map_err(|_| serde::de::Error::custom(format!("invalid octal file mode '{}'", s)))
        }
    }
}

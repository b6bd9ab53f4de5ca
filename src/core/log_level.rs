//! Log level definitions
//!
//! Levels are ordered from most to least severe. A higher number is more
//! verbose, so a threshold admits every level at or below it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LogLevel {
    #[default]
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

/// Returns true when an event at `event` passes a `threshold`.
///
/// This is the only filtering gate; every leveled write goes through it.
///
/// ```
/// use logtic::{admits, LogLevel};
///
/// assert!(admits(LogLevel::Info, LogLevel::Warn));
/// assert!(!admits(LogLevel::Info, LogLevel::Debug));
/// ```
#[inline]
#[must_use]
pub fn admits(threshold: LogLevel, event: LogLevel) -> bool {
    event <= threshold
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Numeric value of the level (`Error = 0` .. `Debug = 3`)
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Error),
            1 => Some(LogLevel::Warn),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Error events go to stderr; everything else goes to stdout.
    #[inline]
    pub(crate) fn uses_stderr(self) -> bool {
        self == LogLevel::Error
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, String> {
        value.parse()
    }
}

impl TryFrom<i32> for LogLevel {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, String> {
        u8::try_from(value)
            .ok()
            .and_then(LogLevel::from_u8)
            .ok_or_else(|| format!("Invalid log level value: {}", value))
    }
}

//! Error types for the logger system

use std::path::Path;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with the operation and path that failed
    #[error("IO error while {operation} '{path}': {source}")]
    IoOperation {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Configuration document could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// The underlying I/O failure, if this error wraps one
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            LoggerError::IoOperation { source, .. } => Some(source),
            _ => None,
        }
    }
}

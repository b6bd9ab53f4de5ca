//! Logging macros for ergonomic log message formatting.
//!
//! These macros take a [`Source`](crate::Source) and `format!`-style
//! arguments. Arguments are only formatted when the level check passes, so a
//! filtered call costs no allocation.
//!
//! # Examples
//!
//! ```
//! use logtic::prelude::*;
//! use logtic::info;
//!
//! let logger = Logger::new();
//! let source = logger.connect("server");
//!
//! // Basic logging
//! info!(source, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(source, "Server listening on port {}", port);
//! ```

/// Log a message at a given level.
///
/// # Examples
///
/// ```
/// # use logtic::prelude::*;
/// # let source = Logger::new().connect("app");
/// use logtic::log;
/// log!(source, LogLevel::Info, "Simple message");
/// log!(source, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($source:expr, $level:expr, $($arg:tt)+) => {
        $source.log($level, ::std::format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use logtic::prelude::*;
/// # let source = Logger::new().connect("app");
/// use logtic::debug;
/// debug!(source, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($source:expr, $($arg:tt)+) => {
        $crate::log!($source, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use logtic::prelude::*;
/// # let source = Logger::new().connect("app");
/// use logtic::info;
/// info!(source, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($source:expr, $($arg:tt)+) => {
        $crate::log!($source, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use logtic::prelude::*;
/// # let source = Logger::new().connect("app");
/// use logtic::warn;
/// warn!(source, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($source:expr, $($arg:tt)+) => {
        $crate::log!($source, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use logtic::prelude::*;
/// # let source = Logger::new().connect("app");
/// use logtic::error;
/// error!(source, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($source:expr, $($arg:tt)+) => {
        $crate::log!($source, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal message and exit the process with status 1.
///
/// # Examples
///
/// ```no_run
/// # use logtic::prelude::*;
/// # let source = Logger::new().connect("app");
/// use logtic::fatal;
/// fatal!(source, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($source:expr, $($arg:tt)+) => {
        $source.fatal(::std::format_args!($($arg)+))
    };
}

/// Build [`Params`](crate::Params) from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use logtic::params;
///
/// let params = params! { "user" => "alice", "attempts" => 3 };
/// assert_eq!(params.to_string(), "attempts=3 user='alice'");
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Params::new()$(.with($key, $value))+
    };
}

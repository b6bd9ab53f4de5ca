//! Message escaping and line layout
//!
//! A line has the shape `[LEVEL][source] message`. The console prints it
//! with an optionally colored prefix; the file prefixes it with a timestamp.

use super::log_level::LogLevel;
use std::borrow::Cow;

/// What an emitted line is labelled with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Level(LogLevel),
    Fatal,
}

impl Tag {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Tag::Level(level) => level.to_str(),
            Tag::Fatal => "FATAL",
        }
    }

    pub(crate) fn uses_stderr(self) -> bool {
        match self {
            Tag::Level(level) => level.uses_stderr(),
            Tag::Fatal => true,
        }
    }
}

/// Replace control characters with two-character escape sequences
///
/// Only `\a \b \t \n \f \r \v` are rewritten, so an event always stays on a
/// single line. Backslashes already present in the message are left alone.
///
/// ```
/// use logtic::escape_control_characters;
///
/// assert_eq!(escape_control_characters("a\nb\tc"), "a\\nb\\tc");
/// ```
pub fn escape_control_characters(message: &str) -> Cow<'_, str> {
    if !message.chars().any(is_escaped_control) {
        return Cow::Borrowed(message);
    }

    let mut out = String::with_capacity(message.len() + 8);
    for c in message.chars() {
        match escape_for(c) {
            Some(code) => {
                out.push('\\');
                out.push(code);
            }
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape_control_characters`]
///
/// Unknown escape sequences are kept verbatim.
pub fn unescape_control_characters(message: &str) -> Cow<'_, str> {
    if !message.contains('\\') {
        return Cow::Borrowed(message);
    }

    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied().and_then(control_for) {
            Some(control) => {
                out.push(control);
                chars.next();
            }
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_escaped_control(c: char) -> bool {
    escape_for(c).is_some()
}

fn escape_for(c: char) -> Option<char> {
    match c {
        '\x07' => Some('a'),
        '\x08' => Some('b'),
        '\t' => Some('t'),
        '\n' => Some('n'),
        '\x0c' => Some('f'),
        '\r' => Some('r'),
        '\x0b' => Some('v'),
        _ => None,
    }
}

fn control_for(code: char) -> Option<char> {
    match code {
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        't' => Some('\t'),
        'n' => Some('\n'),
        'f' => Some('\x0c'),
        'r' => Some('\r'),
        'v' => Some('\x0b'),
        _ => None,
    }
}

/// `[LABEL][source]`
pub(crate) fn prefix(label: &str, source: &str) -> String {
    format!("[{}][{}]", label, source)
}

/// Line printed to the console: `<prefix> <message>\n`
pub(crate) fn console_line(prefix: &str, message: &str) -> String {
    let mut line = String::with_capacity(prefix.len() + message.len() + 2);
    line.push_str(prefix);
    line.push(' ');
    line.push_str(message);
    line.push('\n');
    line
}

/// Line appended to the file: `<timestamp> <text>\n`
pub(crate) fn file_line(timestamp: &str, text: &str) -> String {
    let mut line = String::with_capacity(timestamp.len() + text.len() + 2);
    line.push_str(timestamp);
    line.push(' ');
    line.push_str(text);
    line.push('\n');
    line
}

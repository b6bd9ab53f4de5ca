//! Timestamps used in log lines and archive names
//!
//! File lines carry an RFC 3339 timestamp in local time with second
//! precision (`2025-01-08T10:30:45+09:00`, or a `Z` suffix when local time is
//! UTC). Archives are named after the local calendar date.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, TimeZone};

/// Timestamp for a file line written now
#[must_use]
pub fn line_timestamp() -> String {
    format_line_timestamp(&Local::now())
}

/// Format any zoned time the way file lines do
#[must_use]
pub fn format_line_timestamp<Tz: TimeZone>(datetime: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Today's local date, used for archive names
#[must_use]
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM-DD`
#[must_use]
pub(crate) fn format_archive_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

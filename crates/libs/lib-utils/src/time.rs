//! # Time Utilities
//!
//! Clock and conversion helpers using chrono. Tokens carry unix seconds on
//! the wire; everything else in the workspace works with `DateTime<Utc>`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as RFC3339 with second precision and a `Z` suffix.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Convert unix seconds to a UTC timestamp.
pub fn unix_to_utc(secs: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(secs, 0).ok_or(Error::TimestampOutOfRange(secs))
}

// region:    --- Error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    TimestampOutOfRange(i64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::ParseError;

/// Offset-carrying layouts tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Layouts without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a textual date-time into whole seconds since the UTC epoch.
pub fn parse_timestamp(text: &str) -> Result<i64, ParseError> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.timestamp());
    }
    if let Ok(time) = DateTime::parse_from_rfc2822(text) {
        return Ok(time.timestamp());
    }
    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(text, format) {
            return Ok(time.timestamp());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&time).timestamp());
        }
    }
    Err(ParseError::InvalidTime(text.to_owned()))
}

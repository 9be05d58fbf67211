//! Best-effort publication date parsing.
//!
//! Feeds disagree on date formats, so parsing walks an ordered list of
//! strategies and stops at the first one that succeeds. The order matters:
//! ISO-8601 is tried before the fixed patterns, and changing it changes which
//! ambiguous strings parse.
//!
//! Times without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// One way of turning a date string into Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy {
    /// RFC 3339 / ISO-8601, with or without offset, `Z` accepted as UTC.
    Iso8601,
    /// A fixed `strftime` pattern carrying date and time.
    DateTimePattern(&'static str),
    /// A fixed `strftime` pattern carrying only a date (midnight UTC).
    DatePattern(&'static str),
}

/// Strategies in the order they are attempted.
pub const DATE_STRATEGIES: [DateStrategy; 4] = [
    DateStrategy::Iso8601,
    DateStrategy::DateTimePattern("%Y-%m-%d %H:%M:%S"),
    DateStrategy::DateTimePattern("%Y-%m-%dT%H:%M:%S"),
    DateStrategy::DatePattern("%Y-%m-%d"),
];

const ISO_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const ISO_NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl DateStrategy {
    /// Attempt this strategy alone.
    pub fn parse(&self, s: &str) -> Option<i64> {
        match self {
            DateStrategy::Iso8601 => parse_iso8601(s),
            DateStrategy::DateTimePattern(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.and_utc().timestamp()),
            DateStrategy::DatePattern(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp()),
        }
    }
}

fn parse_iso8601(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    // `+00:00` spelled as `Z` in the non-RFC layouts below.
    let normalized = match s.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };
    for fmt in ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.timestamp());
        }
    }
    for fmt in ISO_NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Parse a date string by trying each of [`DATE_STRATEGIES`] in order.
pub fn parse_date_str(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_STRATEGIES.iter().find_map(|strategy| strategy.parse(s))
}

/// Resolve a raw `pubDate` value into Unix seconds.
///
/// Strings go through [`parse_date_str`]; numbers are already timestamps and
/// are truncated toward zero. Anything else, or any failure, yields `None`.
pub fn parse_pub_datetime(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        _ => None,
    }
}

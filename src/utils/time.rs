//! Timestamp helpers for zap-encoded log records.
//!
//! zap's production encoder writes `ts` as fractional epoch seconds; the
//! development encoder writes an ISO 8601 string. Both are accepted.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parse an RFC 3339 timestamp string
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .context("Failed to parse timestamp")
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert fractional epoch seconds to a UTC timestamp (millisecond precision).
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

/// Decode a `ts` value in either of the encodings zap produces.
pub fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch_seconds),
        Value::String(s) => parse_timestamp(s).ok(),
        _ => None,
    }
}

/// Format a timestamp for display
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Calculate duration between two timestamps in human-readable format
pub fn duration_human(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    let seconds = end.signed_duration_since(*start).num_seconds();

    match seconds {
        s if s < 60 => format!("{} seconds", s),
        s if s < 3600 => format!("{} minutes", s / 60),
        s if s < 86400 => format!("{:.1} hours", s as f64 / 3600.0),
        s => format!("{:.1} days", s as f64 / 86400.0),
    }
}

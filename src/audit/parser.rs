//! Line decoder for admission proxy logs.
//!
//! Turns raw log text into [`LogRecord`]s. Lines that are not a JSON
//! object, or whose `msg` field is not a string of valid JSON text, are
//! dropped; blank lines (including the one after a trailing newline) are
//! routine and dropped the same way.

use super::types::LogRecord;
use thiserror::Error;

/// A single line that could not be decoded.
#[derive(Debug, Error)]
#[error("line {line} is not a decodable log record")]
pub struct DecodeError {
    /// 1-based line number
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Decode one line, outer record and nested payload together.
pub fn decode_line(line_number: usize, line: &str) -> Result<LogRecord, DecodeError> {
    serde_json::from_str(line).map_err(|source| DecodeError {
        line: line_number,
        source,
    })
}

/// Iterate over `content` split on `\n`, yielding each line with its 1-based number.
pub fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content.split('\n').enumerate().map(|(i, line)| (i + 1, line))
}

/// Decode every line of `content`, silently skipping the ones that fail.
///
/// The returned records are in line order; this is the only place the
/// original chronology exists, so callers must not reorder before
/// correlation assigns order numbers.
///
/// # Examples
///
/// ```
/// use admission_log_tools::audit::parser::decode;
///
/// let content = "garbage\n{\"msg\":\"{}\",\"requestId\":\"r1\"}\n";
/// let records = decode(content);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].request_id(), Some("r1"));
/// ```
pub fn decode(content: &str) -> Vec<LogRecord> {
    numbered_lines(content)
        .filter_map(|(number, line)| decode_line(number, line).ok())
        .collect()
}

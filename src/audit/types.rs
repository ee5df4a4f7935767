//! Data structures representing admission webhook proxy log records.
//!
//! Each line of the proxy log is a zap-encoded JSON object whose `msg`
//! field is itself a JSON document serialized to a string. These types
//! decode both layers with serde and carry the record through correlation,
//! selection and analysis.

use crate::utils::time::timestamp_from_value;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object as decoded from the log, keys in their original order.
pub type Payload = Map<String, Value>;

/// Top-level log record.
///
/// Deserializing a record decodes the outer line and the nested `msg`
/// document in one step, so a line whose payload is not JSON text fails as a
/// whole. The payload itself may be any JSON value, `null` included.
///
/// # Fields
///
/// - `level`: zap level (`info`, `error`, ...)
/// - `timestamp`: the raw `ts` value, usually epoch seconds as a float
/// - `caller`: source location reported by the logger
/// - `msg`: the decoded payload
/// - `request_id`: correlation identifier shared by incoming and outgoing records
/// - `request_direction`: `incoming`, `outgoing`, or anything else
/// - `extra`: any other top-level keys, kept verbatim
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(rename = "ts", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(deserialize_with = "decode_payload")]
    pub msg: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_direction: Option<String>,
    #[serde(flatten)]
    pub extra: Payload,
}

/// Decodes the JSON text carried by the `msg` field.
fn decode_payload<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    serde_json::from_str(&text).map_err(de::Error::custom)
}

/// Which side of an admission exchange a record was logged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
    Other,
}

impl LogRecord {
    /// The correlation key, or `None` when it is missing or empty.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn direction(&self) -> Direction {
        match self.request_direction.as_deref() {
            Some("incoming") => Direction::Incoming,
            Some("outgoing") => Direction::Outgoing,
            _ => Direction::Other,
        }
    }

    /// When the record was logged, if `ts` holds a recognizable timestamp.
    pub fn logged_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(timestamp_from_value)
    }

    /// Looks up a value in the payload by JSON pointer, e.g. `/request/namespace`.
    pub fn payload_at(&self, pointer: &str) -> Option<&Value> {
        self.msg.pointer(pointer)
    }
}

/// An incoming record, possibly enriched by its outgoing counterpart.
///
/// `order_number` is the position of the incoming record among all keyed
/// records and exists only to restore chronology after grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTransaction {
    pub order_number: usize,
    pub record: LogRecord,
}

impl MergedTransaction {
    pub fn new(order_number: usize, record: LogRecord) -> Self {
        Self {
            order_number,
            record,
        }
    }

    /// Shallow-merges an outgoing payload into this one; outgoing keys win.
    ///
    /// Keys already present keep their position, new keys are appended.
    /// Nothing happens when the stored payload is falsy, and `false` is
    /// returned so the caller can drop the outgoing record.
    pub fn merge_outgoing(&mut self, outgoing: Value) -> bool {
        if !is_truthy(&self.record.msg) {
            return false;
        }
        let mut merged = Payload::new();
        spread_into(&mut merged, self.record.msg.take());
        spread_into(&mut merged, outgoing);
        self.record.msg = Value::Object(merged);
        true
    }

    /// True when the merged payload is an object with a truthy `AdmissionReview`.
    pub fn is_admission_review(&self) -> bool {
        self.record
            .msg
            .as_object()
            .and_then(|msg| msg.get("AdmissionReview"))
            .is_some_and(is_truthy)
    }
}

/// A completed admission request/response pair, ready for analysis.
///
/// Serializes as the bare merged record; the ordering bookkeeping is gone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AdmissionTransaction {
    pub record: LogRecord,
}

impl From<MergedTransaction> for AdmissionTransaction {
    fn from(merged: MergedTransaction) -> Self {
        Self {
            record: merged.record,
        }
    }
}

impl AdmissionTransaction {
    pub fn request_id(&self) -> Option<&str> {
        self.record.request_id()
    }

    pub fn payload_at(&self, pointer: &str) -> Option<&Value> {
        self.record.payload_at(pointer)
    }
}

/// Copies the own enumerable entries of `value` into `target`, the way an
/// object spread does: object keys, array indices and string characters.
/// Scalars contribute nothing.
fn spread_into(target: &mut Payload, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                target.insert(key, value);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                target.insert(index.to_string(), item);
            }
        }
        Value::String(text) => {
            for (index, ch) in text.chars().enumerate() {
                target.insert(index.to_string(), Value::String(ch.to_string()));
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Flat summary of one admission decision, as written to the output file.
///
/// Fields that were absent in the source are omitted when serialized;
/// present values, explicit `null` included, are copied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_skipped: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_allowed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_references: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_fields: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<Value>,
}

impl AnalyzedEntry {
    /// `kind`, when it is a string.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_ref()?.as_str()
    }

    /// `namespace`, when it is a string.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_ref()?.as_str()
    }

    /// `userInfo.username`, when it is a string.
    pub fn username(&self) -> Option<&str> {
        self.user_info.as_ref()?.get("username")?.as_str()
    }
}

/// JavaScript truthiness: `null`, `false`, `0`, `""` are falsy, containers never are.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! Document codec for agent state snapshots.
//!
//! A stored snapshot is a flat JSON object holding exactly the ten state fields.
//! Timestamps are written as RFC 3339 text in UTC; everything else is a plain
//! string, number or integer. `decode(&encode(&s)) == Ok(s)` for every valid `s`.

use crate::domain::agent::state::{AgentState, AgentStatus};
use crate::domain::errors::MalformedRecordError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Flat key-value representation written to the document store
pub type StoreDocument = Map<String, Value>;

pub const AGENT_ID: &str = "agent_id";
pub const AGENT_TYPE: &str = "agent_type";
pub const STATUS: &str = "status";
pub const PERFORMANCE_SCORE: &str = "performance_score";
pub const CREATED_AT: &str = "created_at";
pub const LAST_HEARTBEAT: &str = "last_heartbeat";
pub const CONFIGURATION_HASH: &str = "configuration_hash";
pub const MEMORY_USAGE_MB: &str = "memory_usage_mb";
pub const ERROR_COUNT: &str = "error_count";
pub const SUCCESS_COUNT: &str = "success_count";

pub const FIELDS: [&str; 10] = [
    AGENT_ID,
    AGENT_TYPE,
    STATUS,
    PERFORMANCE_SCORE,
    CREATED_AT,
    LAST_HEARTBEAT,
    CONFIGURATION_HASH,
    MEMORY_USAGE_MB,
    ERROR_COUNT,
    SUCCESS_COUNT,
];

pub fn encode(state: &AgentState) -> StoreDocument {
    let mut doc = Map::new();
    doc.insert(AGENT_ID.into(), Value::from(state.agent_id()));
    doc.insert(AGENT_TYPE.into(), Value::from(state.agent_type()));
    doc.insert(STATUS.into(), Value::from(state.status().as_str()));
    doc.insert(
        PERFORMANCE_SCORE.into(),
        Value::from(state.performance_score()),
    );
    doc.insert(
        CREATED_AT.into(),
        Value::from(format_timestamp(state.created_at())),
    );
    doc.insert(
        LAST_HEARTBEAT.into(),
        Value::from(format_timestamp(state.last_heartbeat())),
    );
    doc.insert(
        CONFIGURATION_HASH.into(),
        Value::from(state.configuration_hash()),
    );
    doc.insert(MEMORY_USAGE_MB.into(), Value::from(state.memory_usage_mb()));
    doc.insert(ERROR_COUNT.into(), Value::from(state.error_count()));
    doc.insert(SUCCESS_COUNT.into(), Value::from(state.success_count()));
    doc
}

pub fn decode(doc: &StoreDocument) -> Result<AgentState, MalformedRecordError> {
    if let Some(unknown) = doc.keys().find(|key| !FIELDS.contains(&key.as_str())) {
        return Err(MalformedRecordError::UnexpectedField {
            field: unknown.clone(),
        });
    }

    let status_text = get_str(doc, STATUS)?;
    let status = status_text
        .parse::<AgentStatus>()
        .map_err(|_| MalformedRecordError::InvalidStatus {
            value: status_text.to_string(),
        })?;

    let state = AgentState::new(
        get_str(doc, AGENT_ID)?,
        get_str(doc, AGENT_TYPE)?,
        status,
        get_f64(doc, PERFORMANCE_SCORE)?,
        get_timestamp(doc, CREATED_AT)?,
        get_timestamp(doc, LAST_HEARTBEAT)?,
        get_str(doc, CONFIGURATION_HASH)?,
        get_f64(doc, MEMORY_USAGE_MB)?,
        get_u64(doc, ERROR_COUNT)?,
        get_u64(doc, SUCCESS_COUNT)?,
    )?;
    Ok(state)
}

/// Encode a snapshot as JSON text
pub fn encode_json(state: &AgentState) -> String {
    Value::Object(encode(state)).to_string()
}

/// Decode a snapshot from JSON text
pub fn decode_json(text: &str) -> Result<AgentState, MalformedRecordError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| MalformedRecordError::NotADocument {
            reason: e.to_string(),
        })?;
    match value {
        Value::Object(doc) => decode(&doc),
        other => Err(MalformedRecordError::NotADocument {
            reason: format!("expected object, got {}", json_kind(&other)),
        }),
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse ISO-8601 text. Offset-less text is read as UTC, with either `T` or a
/// space between date and time.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    text.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn require<'a>(
    doc: &'a StoreDocument,
    field: &'static str,
) -> Result<&'a Value, MalformedRecordError> {
    doc.get(field)
        .ok_or(MalformedRecordError::MissingField { field })
}

fn get_str<'a>(
    doc: &'a StoreDocument,
    field: &'static str,
) -> Result<&'a str, MalformedRecordError> {
    require(doc, field)?
        .as_str()
        .ok_or(MalformedRecordError::InvalidType {
            field,
            expected: "string",
        })
}

fn get_f64(doc: &StoreDocument, field: &'static str) -> Result<f64, MalformedRecordError> {
    require(doc, field)?
        .as_f64()
        .ok_or(MalformedRecordError::InvalidType {
            field,
            expected: "number",
        })
}

fn get_u64(doc: &StoreDocument, field: &'static str) -> Result<u64, MalformedRecordError> {
    require(doc, field)?
        .as_u64()
        .ok_or(MalformedRecordError::InvalidType {
            field,
            expected: "non-negative integer",
        })
}

fn get_timestamp(
    doc: &StoreDocument,
    field: &'static str,
) -> Result<DateTime<Utc>, MalformedRecordError> {
    let text = require(doc, field)?
        .as_str()
        .ok_or(MalformedRecordError::InvalidType {
            field,
            expected: "ISO-8601 string",
        })?;
    parse_timestamp(text).ok_or_else(|| MalformedRecordError::InvalidTimestamp {
        field,
        value: text.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl AgentState {
    pub fn to_document(&self) -> StoreDocument {
        encode(self)
    }

    pub fn from_document(doc: &StoreDocument) -> Result<Self, MalformedRecordError> {
        decode(doc)
    }
}

impl Serialize for AgentState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AgentState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = StoreDocument::deserialize(deserializer)?;
        decode(&doc).map_err(serde::de::Error::custom)
    }
}

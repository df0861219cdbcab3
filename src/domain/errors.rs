use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised when building or evolving an agent state snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentStateError {
    #[error("Heartbeat {last_heartbeat} precedes creation time {created_at}")]
    HeartbeatBeforeCreation {
        created_at: DateTime<Utc>,
        last_heartbeat: DateTime<Utc>,
    },

    #[error("Timestamp {field} is outside years 1..=9999: {value}")]
    TimestampOutOfRange {
        field: &'static str,
        value: DateTime<Utc>,
    },

    #[error("Metric {field} must be finite, got {value}")]
    NonFiniteMetric { field: &'static str, value: f64 },

    #[error("Memory usage cannot be negative: {value} MB")]
    NegativeMemoryUsage { value: f64 },

    #[error("Field {field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("Invalid agent status: {value}. Must be ACTIVE, PAUSED, EVOLVING or FAILED")]
    InvalidStatus { value: String },

    #[error(
        "Counter {counter} regressed for {agent_id}: {previous} -> {current} at {last_heartbeat}"
    )]
    CounterRegression {
        agent_id: String,
        counter: &'static str,
        previous: u64,
        current: u64,
        last_heartbeat: DateTime<Utc>,
    },

    #[error("Snapshot sequence mixes agents: expected {expected}, found {found}")]
    MixedAgents { expected: String, found: String },
}

/// Errors raised when reconstructing an agent state from a stored document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecordError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Field {field} is not valid ISO-8601 text: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Invalid status value: {value}")]
    InvalidStatus { value: String },

    #[error("Field {field} has the wrong type: expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Unexpected field in agent state document: {field}")]
    UnexpectedField { field: String },

    #[error("Invalid agent state record: {0}")]
    InvalidRecord(#[from] AgentStateError),

    #[error("Document stored under {key} belongs to agent {agent_id}")]
    KeyMismatch { key: String, agent_id: String },

    #[error("Agent state document is not a JSON object: {reason}")]
    NotADocument { reason: String },
}

use crate::domain::errors::AgentStateError;
use chrono::{DateTime, Datelike, Utc};
use std::fmt;
use std::str::FromStr;

/// Years representable as four-digit ISO-8601 text
pub const TIMESTAMP_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Lifecycle status of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentStatus {
    Active,
    Paused,
    Evolving,
    Failed,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 4] = [
        AgentStatus::Active,
        AgentStatus::Paused,
        AgentStatus::Evolving,
        AgentStatus::Failed,
    ];

    /// Stored text of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "ACTIVE",
            AgentStatus::Paused => "PAUSED",
            AgentStatus::Evolving => "EVOLVING",
            AgentStatus::Failed => "FAILED",
        }
    }

    pub fn to_metric_value(&self) -> f64 {
        match self {
            AgentStatus::Active => 1.0,
            AgentStatus::Paused => 0.5,
            AgentStatus::Evolving => 0.75,
            AgentStatus::Failed => 0.0,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = AgentStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AgentStatus::Active),
            "PAUSED" => Ok(AgentStatus::Paused),
            "EVOLVING" => Ok(AgentStatus::Evolving),
            "FAILED" => Ok(AgentStatus::Failed),
            _ => Err(AgentStateError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Point-in-time snapshot of one agent's identity and health.
///
/// Values are never mutated in place: every `with_*` / `record_*` call returns a
/// new snapshot, so `agent_id` and `created_at` are fixed for the lifetime of the
/// agent and snapshots can be shared freely between readers.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    agent_id: String,
    agent_type: String,
    status: AgentStatus,
    performance_score: f64,
    created_at: DateTime<Utc>,
    last_heartbeat: DateTime<Utc>,
    configuration_hash: String,
    memory_usage_mb: f64,
    error_count: u64,
    success_count: u64,
}

impl AgentState {
    /// Build a snapshot, rejecting a heartbeat earlier than the creation time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agent_id: impl Into<String>,
        agent_type: impl Into<String>,
        status: AgentStatus,
        performance_score: f64,
        created_at: DateTime<Utc>,
        last_heartbeat: DateTime<Utc>,
        configuration_hash: impl Into<String>,
        memory_usage_mb: f64,
        error_count: u64,
        success_count: u64,
    ) -> Result<Self, AgentStateError> {
        let state = Self {
            agent_id: agent_id.into(),
            agent_type: agent_type.into(),
            status,
            performance_score,
            created_at,
            last_heartbeat,
            configuration_hash: configuration_hash.into(),
            memory_usage_mb,
            error_count,
            success_count,
        };
        state.validate()?;
        Ok(state)
    }

    /// Fresh ACTIVE snapshot for a newly created agent, with zeroed metrics.
    pub fn initial(
        agent_id: impl Into<String>,
        agent_type: impl Into<String>,
        configuration_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, AgentStateError> {
        Self::new(
            agent_id,
            agent_type,
            AgentStatus::Active,
            0.0,
            now,
            now,
            configuration_hash,
            0.0,
            0,
            0,
        )
    }

    fn validate(&self) -> Result<(), AgentStateError> {
        if self.agent_id.is_empty() {
            return Err(AgentStateError::EmptyField { field: "agent_id" });
        }
        if self.agent_type.is_empty() {
            return Err(AgentStateError::EmptyField {
                field: "agent_type",
            });
        }
        ensure_representable("created_at", self.created_at)?;
        ensure_representable("last_heartbeat", self.last_heartbeat)?;
        if self.last_heartbeat < self.created_at {
            return Err(AgentStateError::HeartbeatBeforeCreation {
                created_at: self.created_at,
                last_heartbeat: self.last_heartbeat,
            });
        }
        ensure_finite("performance_score", self.performance_score)?;
        ensure_finite("memory_usage_mb", self.memory_usage_mb)?;
        if self.memory_usage_mb < 0.0 {
            return Err(AgentStateError::NegativeMemoryUsage {
                value: self.memory_usage_mb,
            });
        }
        Ok(())
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn agent_type(&self) -> &str {
        &self.agent_type
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn performance_score(&self) -> f64 {
        self.performance_score
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_heartbeat(&self) -> DateTime<Utc> {
        self.last_heartbeat
    }

    pub fn configuration_hash(&self) -> &str {
        &self.configuration_hash
    }

    pub fn memory_usage_mb(&self) -> f64 {
        self.memory_usage_mb
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn with_status(&self, status: AgentStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn with_heartbeat(&self, at: DateTime<Utc>) -> Result<Self, AgentStateError> {
        ensure_representable("last_heartbeat", at)?;
        if at < self.created_at {
            return Err(AgentStateError::HeartbeatBeforeCreation {
                created_at: self.created_at,
                last_heartbeat: at,
            });
        }
        Ok(Self {
            last_heartbeat: at,
            ..self.clone()
        })
    }

    /// Heartbeat at `at`, or keep the current one when `at` is older.
    pub fn advance_heartbeat(&self, at: DateTime<Utc>) -> Result<Self, AgentStateError> {
        self.with_heartbeat(at.max(self.last_heartbeat))
    }

    pub fn with_performance_score(&self, score: f64) -> Result<Self, AgentStateError> {
        ensure_finite("performance_score", score)?;
        Ok(Self {
            performance_score: score,
            ..self.clone()
        })
    }

    pub fn with_memory_usage(&self, memory_usage_mb: f64) -> Result<Self, AgentStateError> {
        ensure_finite("memory_usage_mb", memory_usage_mb)?;
        if memory_usage_mb < 0.0 {
            return Err(AgentStateError::NegativeMemoryUsage {
                value: memory_usage_mb,
            });
        }
        Ok(Self {
            memory_usage_mb,
            ..self.clone()
        })
    }

    pub fn with_configuration_hash(&self, configuration_hash: impl Into<String>) -> Self {
        Self {
            configuration_hash: configuration_hash.into(),
            ..self.clone()
        }
    }

    pub fn record_success(&self) -> Self {
        Self {
            success_count: self.success_count.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn record_error(&self) -> Self {
        Self {
            error_count: self.error_count.saturating_add(1),
            ..self.clone()
        }
    }
}

fn ensure_representable(field: &'static str, at: DateTime<Utc>) -> Result<(), AgentStateError> {
    if TIMESTAMP_YEARS.contains(&at.year()) {
        Ok(())
    } else {
        Err(AgentStateError::TimestampOutOfRange { field, value: at })
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), AgentStateError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AgentStateError::NonFiniteMetric { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap()
    }

    #[test]
    fn test_status_parses_only_enumerated_values() {
        for status in AgentStatus::ALL {
            assert_eq!(status.as_str().parse::<AgentStatus>().unwrap(), status);
        }
        assert!("active".parse::<AgentStatus>().is_err());
        assert!("SLEEPING".parse::<AgentStatus>().is_err());
        assert!("".parse::<AgentStatus>().is_err());
    }

    #[test]
    fn test_new_rejects_heartbeat_before_creation() {
        let result = AgentState::new(
            "risk_00000001",
            "risk",
            AgentStatus::Active,
            0.0,
            at(5),
            at(0),
            "abc",
            10.0,
            0,
            0,
        );
        assert!(matches!(
            result,
            Err(AgentStateError::HeartbeatBeforeCreation { .. })
        ));
    }

    #[test]
    fn test_new_rejects_non_finite_metrics() {
        let result = AgentState::new(
            "risk_00000001",
            "risk",
            AgentStatus::Active,
            f64::NAN,
            at(0),
            at(0),
            "abc",
            10.0,
            0,
            0,
        );
        assert!(matches!(
            result,
            Err(AgentStateError::NonFiniteMetric {
                field: "performance_score",
                ..
            })
        ));

        let state = AgentState::initial("risk_00000001", "risk", "abc", at(0)).unwrap();
        assert!(state.with_memory_usage(f64::INFINITY).is_err());
        assert!(state.with_memory_usage(-1.0).is_err());
    }

    #[test]
    fn test_new_rejects_empty_identity() {
        let result = AgentState::initial("", "risk", "abc", at(0));
        assert_eq!(
            result,
            Err(AgentStateError::EmptyField { field: "agent_id" })
        );
    }

    #[test]
    fn test_updates_produce_new_values() {
        let original = AgentState::initial("execution_1a2b3c4d", "execution", "abc", at(0)).unwrap();

        let updated = original
            .with_status(AgentStatus::Paused)
            .record_success()
            .record_success()
            .record_error()
            .with_heartbeat(at(3))
            .unwrap();

        assert_eq!(original.status(), AgentStatus::Active);
        assert_eq!(original.success_count(), 0);
        assert_eq!(original.last_heartbeat(), at(0));

        assert_eq!(updated.agent_id(), original.agent_id());
        assert_eq!(updated.created_at(), original.created_at());
        assert_eq!(updated.status(), AgentStatus::Paused);
        assert_eq!(updated.success_count(), 2);
        assert_eq!(updated.error_count(), 1);
        assert_eq!(updated.last_heartbeat(), at(3));
    }

    #[test]
    fn test_heartbeat_cannot_move_before_creation() {
        let state = AgentState::initial("analyzer_ab12cd34", "analyzer", "abc", at(10)).unwrap();
        assert!(state.with_heartbeat(at(9)).is_err());
        assert!(state.with_heartbeat(at(10)).is_ok());
    }

    #[test]
    fn test_advance_heartbeat_keeps_newest() {
        let state = AgentState::initial("risk_00000001", "risk", "abc", at(0))
            .unwrap()
            .with_heartbeat(at(5))
            .unwrap();
        assert_eq!(state.advance_heartbeat(at(3)).unwrap().last_heartbeat(), at(5));
        assert_eq!(state.advance_heartbeat(at(7)).unwrap().last_heartbeat(), at(7));
    }

    #[test]
    fn test_timestamps_outside_four_digit_years_are_rejected() {
        let year_10000 = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let year_0 = Utc.with_ymd_and_hms(0, 12, 31, 23, 59, 59).unwrap();

        assert!(matches!(
            AgentState::initial("risk_00000001", "risk", "abc", year_10000),
            Err(AgentStateError::TimestampOutOfRange {
                field: "created_at",
                ..
            })
        ));
        assert!(matches!(
            AgentState::initial("risk_00000001", "risk", "abc", year_0),
            Err(AgentStateError::TimestampOutOfRange { .. })
        ));

        let state = AgentState::initial("risk_00000001", "risk", "abc", at(0)).unwrap();
        assert!(matches!(
            state.with_heartbeat(year_10000),
            Err(AgentStateError::TimestampOutOfRange {
                field: "last_heartbeat",
                ..
            })
        ));
    }
}

use crate::domain::agent::state::AgentState;
use crate::domain::errors::AgentStateError;

/// Check that counters never decrease across snapshots of a single agent.
///
/// Snapshots are ordered by `last_heartbeat` before comparison. A lower count
/// means the identity was reset, which is a different agent, not a mutation.
pub fn verify_counter_monotonicity(snapshots: &[AgentState]) -> Result<(), AgentStateError> {
    let Some(first) = snapshots.first() else {
        return Ok(());
    };

    if let Some(other) = snapshots.iter().find(|s| s.agent_id() != first.agent_id()) {
        return Err(AgentStateError::MixedAgents {
            expected: first.agent_id().to_string(),
            found: other.agent_id().to_string(),
        });
    }

    let mut ordered: Vec<&AgentState> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.last_heartbeat());

    for pair in ordered.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        check_counter("error_count", prev.error_count(), next.error_count(), next)?;
        check_counter(
            "success_count",
            prev.success_count(),
            next.success_count(),
            next,
        )?;
    }
    Ok(())
}

fn check_counter(
    counter: &'static str,
    previous: u64,
    current: u64,
    next: &AgentState,
) -> Result<(), AgentStateError> {
    if current < previous {
        return Err(AgentStateError::CounterRegression {
            agent_id: next.agent_id().to_string(),
            counter,
            previous,
            current,
            last_heartbeat: next.last_heartbeat(),
        });
    }
    Ok(())
}

use crate::domain::agent::state::{AgentState, AgentStatus};
use crate::infrastructure::observability::Metrics;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Registry of the latest snapshot of every agent in the system.
///
/// Snapshots are immutable and shared as `Arc`, so readers never hold the lock
/// longer than a map lookup.
pub struct AgentStatusRegistry {
    snapshots: RwLock<HashMap<String, Arc<AgentState>>>,
    metrics: Option<Metrics>,
}

impl AgentStatusRegistry {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            metrics: Some(metrics),
        }
    }

    pub fn without_metrics() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            metrics: None,
        }
    }

    /// Record a snapshot. Returns false when it is older than the one already held.
    pub async fn observe(&self, snapshot: Arc<AgentState>) -> bool {
        let mut snapshots = self.snapshots.write().await;

        if let Some(current) = snapshots.get(snapshot.agent_id())
            && snapshot.last_heartbeat() < current.last_heartbeat()
        {
            debug!(
                "Ignoring stale snapshot for {} ({} < {})",
                snapshot.agent_id(),
                snapshot.last_heartbeat(),
                current.last_heartbeat()
            );
            return false;
        }

        if let Some(metrics) = &self.metrics {
            Self::export(metrics, &snapshot);
        }
        snapshots.insert(snapshot.agent_id().to_string(), snapshot);
        true
    }

    fn export(metrics: &Metrics, snapshot: &AgentState) {
        let labels = [snapshot.agent_id()];
        metrics
            .agent_status
            .with_label_values(&labels)
            .set(snapshot.status().to_metric_value());
        metrics
            .agent_performance_score
            .with_label_values(&labels)
            .set(snapshot.performance_score());
        metrics
            .agent_last_heartbeat_seconds
            .with_label_values(&labels)
            .set(snapshot.last_heartbeat().timestamp() as f64);
        metrics
            .agent_errors
            .with_label_values(&labels)
            .set(snapshot.error_count() as f64);
        metrics
            .agent_successes
            .with_label_values(&labels)
            .set(snapshot.success_count() as f64);
        metrics
            .agent_memory_usage_mb
            .with_label_values(&labels)
            .set(snapshot.memory_usage_mb());
    }

    /// Stop tracking an agent
    pub async fn remove(&self, agent_id: &str) -> Option<Arc<AgentState>> {
        let removed = self.snapshots.write().await.remove(agent_id);
        if let Some(metrics) = &self.metrics {
            metrics.remove_agent(agent_id);
        }
        removed
    }

    /// Get all agent snapshots
    pub async fn get_all(&self) -> HashMap<String, Arc<AgentState>> {
        self.snapshots.read().await.clone()
    }

    /// Get the snapshot of a specific agent
    pub async fn get(&self, agent_id: &str) -> Option<Arc<AgentState>> {
        self.snapshots.read().await.get(agent_id).cloned()
    }

    /// Agents currently in the given status
    pub async fn by_status(&self, status: AgentStatus) -> Vec<Arc<AgentState>> {
        let mut matching: Vec<Arc<AgentState>> = self
            .snapshots
            .read()
            .await
            .values()
            .filter(|s| s.status() == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.agent_id().cmp(b.agent_id()));
        matching
    }

    /// Get all snapshots synchronously (non-blocking, returns empty if lock is held)
    pub fn get_all_sync(&self) -> HashMap<String, Arc<AgentState>> {
        if let Ok(guard) = self.snapshots.try_read() {
            guard.clone()
        } else {
            HashMap::new()
        }
    }
}

//! Prometheus metrics definitions for EDMAS
//!
//! All metrics use the `edmas_` prefix and are labelled by `agent_id`.

use prometheus::{
    GaugeVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGaugeVec},
};
use std::sync::Arc;

/// Prometheus metrics for agent health
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Status per agent (1=active, 0.75=evolving, 0.5=paused, 0=failed)
    pub agent_status: GenericGaugeVec<AtomicF64>,
    /// Performance score per agent
    pub agent_performance_score: GenericGaugeVec<AtomicF64>,
    /// Last heartbeat per agent (unix seconds)
    pub agent_last_heartbeat_seconds: GenericGaugeVec<AtomicF64>,
    /// Error count per agent
    pub agent_errors: GenericGaugeVec<AtomicF64>,
    /// Success count per agent
    pub agent_successes: GenericGaugeVec<AtomicF64>,
    /// Memory usage per agent in MB
    pub agent_memory_usage_mb: GenericGaugeVec<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let agent_status = Self::agent_gauge(
            &registry,
            "edmas_agent_status",
            "Agent status (1=active, 0.75=evolving, 0.5=paused, 0=failed)",
        )?;
        let agent_performance_score = Self::agent_gauge(
            &registry,
            "edmas_agent_performance_score",
            "Agent performance score",
        )?;
        let agent_last_heartbeat_seconds = Self::agent_gauge(
            &registry,
            "edmas_agent_last_heartbeat_seconds",
            "Unix time of the agent's last heartbeat",
        )?;
        let agent_errors =
            Self::agent_gauge(&registry, "edmas_agent_errors", "Agent error count")?;
        let agent_successes =
            Self::agent_gauge(&registry, "edmas_agent_successes", "Agent success count")?;
        let agent_memory_usage_mb = Self::agent_gauge(
            &registry,
            "edmas_agent_memory_usage_mb",
            "Agent memory usage in MB",
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            agent_status,
            agent_performance_score,
            agent_last_heartbeat_seconds,
            agent_errors,
            agent_successes,
            agent_memory_usage_mb,
        })
    }

    fn agent_gauge(
        registry: &Registry,
        name: &str,
        help: &str,
    ) -> anyhow::Result<GenericGaugeVec<AtomicF64>> {
        let gauge = GaugeVec::new(Opts::new(name, help), &["agent_id"])?;
        registry.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Drop every series of an agent
    pub fn remove_agent(&self, agent_id: &str) {
        for gauge in [
            &self.agent_status,
            &self.agent_performance_score,
            &self.agent_last_heartbeat_seconds,
            &self.agent_errors,
            &self.agent_successes,
            &self.agent_memory_usage_mb,
        ] {
            let _ = gauge.remove_label_values(&[agent_id]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics
            .agent_status
            .with_label_values(&["risk_00000001"])
            .set(1.0);
        assert!(metrics.render().contains("edmas_agent_status"));
    }

    #[test]
    fn test_per_agent_series() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics
            .agent_performance_score
            .with_label_values(&["analyzer_00000001"])
            .set(0.73);
        metrics
            .agent_performance_score
            .with_label_values(&["risk_00000002"])
            .set(-0.2);

        let output = metrics.render();
        assert!(output.contains("analyzer_00000001"));
        assert!(output.contains("risk_00000002"));

        metrics.remove_agent("risk_00000002");
        assert!(!metrics.render().contains("risk_00000002"));
    }
}

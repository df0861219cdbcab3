use crate::domain::agent::state::{AgentState, AgentStatus};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Category of a trading agent, stored as the `agent_type` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AgentKind {
    MarketAnalyzer,
    RiskManager,
    Execution,
    #[default]
    Generic,
    Other(String),
}

impl AgentKind {
    pub fn tag(&self) -> &str {
        match self {
            AgentKind::MarketAnalyzer => "analyzer",
            AgentKind::RiskManager => "risk",
            AgentKind::Execution => "execution",
            AgentKind::Generic => "generic",
            AgentKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AgentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.is_empty() {
            anyhow::bail!("Agent type cannot be empty");
        }
        Ok(match tag.to_lowercase().as_str() {
            "analyzer" => AgentKind::MarketAnalyzer,
            "risk" => AgentKind::RiskManager,
            "execution" => AgentKind::Execution,
            "generic" => AgentKind::Generic,
            _ => AgentKind::Other(tag.to_string()),
        })
    }
}

/// Obligations every concrete trading agent must satisfy.
///
/// Analysis, risk and execution behavior live in the implementors; this trait
/// only fixes the lifecycle surface the rest of the system relies on.
#[async_trait]
pub trait TradingAgent: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Latest snapshot of this agent
    fn state(&self) -> Arc<AgentState>;

    /// Called when the agent's status is changed from outside
    async fn on_status_change(&mut self, from: AgentStatus, to: AgentStatus) -> Result<()>;

    /// Emit a liveness signal and return the resulting snapshot
    async fn emit_heartbeat(&mut self) -> Result<Arc<AgentState>>;

    /// Recompute and return the agent's performance score
    async fn update_performance(&mut self) -> Result<f64>;
}

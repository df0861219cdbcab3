//! Shared lifecycle shell for every trading agent.
//!
//! `BaseAgent` owns the agent's identity and current snapshot. It restores prior
//! state from the repository at startup and persists a new snapshot on every
//! change. Concrete agents embed it and implement `TradingAgent` on top.

use crate::application::monitoring::AgentStatusRegistry;
use crate::config::RestorePolicy;
use crate::domain::agent::capability::AgentKind;
use crate::domain::agent::identity::{configuration_hash, mint_agent_id};
use crate::domain::agent::state::{AgentState, AgentStatus};
use crate::domain::errors::MalformedRecordError;
use crate::domain::repositories::AgentStateRepository;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Startup parameters of an agent
#[derive(Debug, Clone, Default)]
pub struct BaseAgentOptions {
    /// Existing identity to resume; a new id is minted when absent
    pub agent_id: Option<String>,
    pub kind: AgentKind,
    /// Agent configuration, hashed to detect drift between restarts
    pub configuration: Value,
    pub restore_policy: RestorePolicy,
}

impl BaseAgentOptions {
    pub fn new(kind: AgentKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_restore_policy(mut self, restore_policy: RestorePolicy) -> Self {
        self.restore_policy = restore_policy;
        self
    }
}

pub struct BaseAgent {
    kind: AgentKind,
    configuration: Value,
    state: Arc<AgentState>,
    repository: Arc<dyn AgentStateRepository>,
    registry: Option<Arc<AgentStatusRegistry>>,
}

impl BaseAgent {
    pub async fn start(
        options: BaseAgentOptions,
        repository: Arc<dyn AgentStateRepository>,
    ) -> Result<Self> {
        Self::start_at(options, repository, Utc::now()).await
    }

    /// Restore or create the agent's snapshot as of `now` and persist it.
    pub async fn start_at(
        options: BaseAgentOptions,
        repository: Arc<dyn AgentStateRepository>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let BaseAgentOptions {
            agent_id,
            kind,
            configuration,
            restore_policy,
        } = options;

        let agent_id = agent_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| mint_agent_id(kind.tag()));
        let config_hash = configuration_hash(&configuration);

        let prior = match repository.load(&agent_id).await {
            Ok(prior) => prior,
            Err(e) if e.downcast_ref::<MalformedRecordError>().is_some() => match restore_policy
            {
                RestorePolicy::Fresh => {
                    warn!(
                        "Discarding unreadable state for {}: {:#}. Starting fresh.",
                        agent_id, e
                    );
                    None
                }
                RestorePolicy::Fail => {
                    return Err(e.context(format!("Cannot restore agent {}", agent_id)));
                }
            },
            Err(e) => return Err(e),
        };

        let state = match prior {
            Some(prior) => Self::resume(prior, &kind, &config_hash, now)?,
            None => {
                info!("Initializing new agent {} ({})", agent_id, kind);
                AgentState::initial(&agent_id, kind.tag(), &config_hash, now)?
            }
        };

        repository
            .save(&state)
            .await
            .with_context(|| format!("Failed to persist startup state of {}", agent_id))?;

        Ok(Self {
            kind,
            configuration,
            state: Arc::new(state),
            repository,
            registry: None,
        })
    }

    fn resume(
        prior: AgentState,
        kind: &AgentKind,
        config_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<AgentState> {
        if prior.agent_type() != kind.tag() {
            anyhow::bail!(
                "Agent {} is stored as type {}, cannot start it as {}",
                prior.agent_id(),
                prior.agent_type(),
                kind
            );
        }

        let mut state = prior.advance_heartbeat(now)?;
        if prior.configuration_hash() != config_hash {
            warn!(
                "Configuration drift for {}: {} -> {}",
                prior.agent_id(),
                prior.configuration_hash(),
                config_hash
            );
            state = state.with_configuration_hash(config_hash);
        }

        info!(
            "Restored agent {} (status={}, successes={}, errors={})",
            state.agent_id(),
            state.status(),
            state.success_count(),
            state.error_count()
        );
        Ok(state)
    }

    /// Publish every subsequent snapshot to a status registry
    pub async fn with_registry(mut self, registry: Arc<AgentStatusRegistry>) -> Self {
        registry.observe(self.state.clone()).await;
        self.registry = Some(registry);
        self
    }

    pub fn agent_id(&self) -> &str {
        self.state.agent_id()
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn configuration(&self) -> &Value {
        &self.configuration
    }

    /// Current snapshot, safe to hand to other tasks
    pub fn snapshot(&self) -> Arc<AgentState> {
        self.state.clone()
    }

    pub async fn heartbeat(&mut self) -> Result<Arc<AgentState>> {
        self.heartbeat_at(Utc::now()).await
    }

    /// Record liveness at `at`. The heartbeat never moves backwards.
    pub async fn heartbeat_at(&mut self, at: DateTime<Utc>) -> Result<Arc<AgentState>> {
        let next = self.state.advance_heartbeat(at)?;
        self.commit(next).await
    }

    pub async fn transition(&mut self, to: AgentStatus) -> Result<Arc<AgentState>> {
        let from = self.state.status();
        if from != to {
            info!("Agent {} status {} -> {}", self.agent_id(), from, to);
        }
        let next = self.state.with_status(to);
        self.commit(next).await
    }

    pub async fn record_success(&mut self) -> Result<Arc<AgentState>> {
        let next = self.state.record_success();
        self.commit(next).await
    }

    pub async fn record_error(&mut self) -> Result<Arc<AgentState>> {
        let next = self.state.record_error();
        self.commit(next).await
    }

    pub async fn set_performance_score(&mut self, score: f64) -> Result<Arc<AgentState>> {
        let next = self.state.with_performance_score(score)?;
        self.commit(next).await
    }

    pub async fn set_memory_usage(&mut self, memory_usage_mb: f64) -> Result<Arc<AgentState>> {
        let next = self.state.with_memory_usage(memory_usage_mb)?;
        self.commit(next).await
    }

    /// Persist first; the snapshot only becomes current once the write succeeded.
    async fn commit(&mut self, next: AgentState) -> Result<Arc<AgentState>> {
        self.repository
            .save(&next)
            .await
            .with_context(|| format!("Failed to persist snapshot of {}", next.agent_id()))?;

        let next = Arc::new(next);
        self.state = next.clone();
        if let Some(registry) = &self.registry {
            registry.observe(next.clone()).await;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::codec::{CONFIGURATION_HASH, encode};
    use crate::domain::ports::DocumentStore;
    use crate::infrastructure::persistence::{
        DEFAULT_AGENT_COLLECTION, DocumentAgentStateRepository,
    };
    use crate::infrastructure::repositories::InMemoryDocumentStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn repository() -> (Arc<InMemoryDocumentStore>, Arc<DocumentAgentStateRepository>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = Arc::new(DocumentAgentStateRepository::new(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn test_start_mints_identity_and_persists() {
        let (_, repo) = repository();
        let agent = BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::MarketAnalyzer),
            repo.clone(),
            t0(),
        )
        .await
        .unwrap();

        assert!(agent.agent_id().starts_with("analyzer_"));
        let snapshot = agent.snapshot();
        assert_eq!(snapshot.status(), AgentStatus::Active);
        assert_eq!(snapshot.created_at(), t0());
        assert_eq!(snapshot.last_heartbeat(), t0());

        let stored = repo.load(agent.agent_id()).await.unwrap().unwrap();
        assert_eq!(&stored, snapshot.as_ref());
    }

    #[tokio::test]
    async fn test_restart_restores_counters_and_creation_time() {
        let (_, repo) = repository();
        let options = BaseAgentOptions::new(AgentKind::Execution)
            .with_agent_id("execution_1a2b3c4d")
            .with_configuration(json!({"venue": "paper"}));

        let mut agent = BaseAgent::start_at(options.clone(), repo.clone(), t0())
            .await
            .unwrap();
        agent.record_success().await.unwrap();
        agent.record_success().await.unwrap();
        agent.record_error().await.unwrap();
        agent.transition(AgentStatus::Paused).await.unwrap();

        let later = t0() + Duration::hours(1);
        let restarted = BaseAgent::start_at(options, repo, later).await.unwrap();
        let snapshot = restarted.snapshot();
        assert_eq!(snapshot.created_at(), t0());
        assert_eq!(snapshot.last_heartbeat(), later);
        assert_eq!(snapshot.success_count(), 2);
        assert_eq!(snapshot.error_count(), 1);
        assert_eq!(snapshot.status(), AgentStatus::Paused);
    }

    #[tokio::test]
    async fn test_restart_records_configuration_drift() {
        let (_, repo) = repository();
        let first = BaseAgentOptions::new(AgentKind::RiskManager)
            .with_agent_id("risk_00000001")
            .with_configuration(json!({"max_drawdown": 0.1}));
        let original = BaseAgent::start_at(first.clone(), repo.clone(), t0())
            .await
            .unwrap()
            .snapshot();

        let second = first.with_configuration(json!({"max_drawdown": 0.2}));
        let restarted = BaseAgent::start_at(second, repo.clone(), t0())
            .await
            .unwrap()
            .snapshot();

        assert_ne!(
            original.configuration_hash(),
            restarted.configuration_hash()
        );
        assert_eq!(
            restarted.configuration_hash(),
            configuration_hash(&json!({"max_drawdown": 0.2}))
        );
        let stored = repo.load("risk_00000001").await.unwrap().unwrap();
        assert_eq!(stored.configuration_hash(), restarted.configuration_hash());
    }

    #[tokio::test]
    async fn test_restart_with_other_type_is_rejected() {
        let (_, repo) = repository();
        BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::RiskManager).with_agent_id("shared_id"),
            repo.clone(),
            t0(),
        )
        .await
        .unwrap();

        let result = BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::Execution).with_agent_id("shared_id"),
            repo,
            t0(),
        )
        .await;
        assert!(result.is_err());
    }

    async fn seed_malformed(store: &InMemoryDocumentStore, agent_id: &str) {
        let state = AgentState::initial(agent_id, "analyzer", "abc", t0()).unwrap();
        let mut document = encode(&state);
        document.remove(CONFIGURATION_HASH);
        store
            .set(DEFAULT_AGENT_COLLECTION, agent_id, &document)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_malformed_state_with_fresh_policy() {
        let (store, repo) = repository();
        seed_malformed(&store, "analyzer_ab12cd34").await;

        let later = t0() + Duration::minutes(10);
        let agent = BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::MarketAnalyzer)
                .with_agent_id("analyzer_ab12cd34")
                .with_restore_policy(RestorePolicy::Fresh),
            repo.clone(),
            later,
        )
        .await
        .unwrap();

        assert_eq!(agent.snapshot().created_at(), later);
        assert!(repo.load("analyzer_ab12cd34").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_state_with_fail_policy() {
        let (store, repo) = repository();
        seed_malformed(&store, "analyzer_ab12cd34").await;

        let err = BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::MarketAnalyzer)
                .with_agent_id("analyzer_ab12cd34")
                .with_restore_policy(RestorePolicy::Fail),
            repo,
            t0(),
        )
        .await
        .err()
        .unwrap();

        assert!(err.downcast_ref::<MalformedRecordError>().is_some());
    }

    #[tokio::test]
    async fn test_foreign_document_is_not_adopted() {
        let (store, repo) = repository();
        let foreign = AgentState::initial("analyzer_bbbbbbbb", "analyzer", "abc", t0()).unwrap();
        store
            .set(DEFAULT_AGENT_COLLECTION, "analyzer_aaaaaaaa", &encode(&foreign))
            .await
            .unwrap();

        let options = BaseAgentOptions::new(AgentKind::MarketAnalyzer)
            .with_agent_id("analyzer_aaaaaaaa");
        let err = BaseAgent::start_at(
            options.clone().with_restore_policy(RestorePolicy::Fail),
            repo.clone(),
            t0(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(
            err.downcast_ref::<MalformedRecordError>(),
            Some(MalformedRecordError::KeyMismatch { .. })
        ));

        let later = t0() + Duration::minutes(1);
        let agent = BaseAgent::start_at(options, repo.clone(), later)
            .await
            .unwrap();
        assert_eq!(agent.agent_id(), "analyzer_aaaaaaaa");
        assert_eq!(agent.snapshot().created_at(), later);
        let stored = repo.load("analyzer_aaaaaaaa").await.unwrap().unwrap();
        assert_eq!(stored.agent_id(), "analyzer_aaaaaaaa");
    }

    #[tokio::test]
    async fn test_heartbeat_never_moves_backwards() {
        let (_, repo) = repository();
        let mut agent = BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::Generic),
            repo,
            t0() + Duration::minutes(5),
        )
        .await
        .unwrap();

        let snapshot = agent.heartbeat_at(t0()).await.unwrap();
        assert_eq!(snapshot.last_heartbeat(), t0() + Duration::minutes(5));

        let snapshot = agent
            .heartbeat_at(t0() + Duration::minutes(6))
            .await
            .unwrap();
        assert_eq!(snapshot.last_heartbeat(), t0() + Duration::minutes(6));
    }

    #[tokio::test]
    async fn test_invalid_telemetry_leaves_snapshot_unchanged() {
        let (_, repo) = repository();
        let mut agent = BaseAgent::start_at(BaseAgentOptions::new(AgentKind::Generic), repo, t0())
            .await
            .unwrap();

        let before = agent.snapshot();
        assert!(agent.set_memory_usage(-5.0).await.is_err());
        assert!(agent.set_performance_score(f64::NAN).await.is_err());
        assert_eq!(agent.snapshot(), before);

        let after = agent.set_performance_score(0.42).await.unwrap();
        assert_eq!(after.performance_score(), 0.42);
    }

    struct FailingRepository;

    #[async_trait]
    impl AgentStateRepository for FailingRepository {
        async fn save(&self, _state: &AgentState) -> Result<()> {
            anyhow::bail!("store offline")
        }
        async fn load(&self, _agent_id: &str) -> Result<Option<AgentState>> {
            Ok(None)
        }
        async fn delete(&self, _agent_id: &str) -> Result<bool> {
            Ok(false)
        }
        async fn list_all(&self) -> Result<Vec<AgentState>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let result = BaseAgent::start_at(
            BaseAgentOptions::new(AgentKind::Generic),
            Arc::new(FailingRepository),
            t0(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_registry_receives_snapshots() {
        let (_, repo) = repository();
        let registry = Arc::new(AgentStatusRegistry::without_metrics());
        let mut agent = BaseAgent::start_at(BaseAgentOptions::new(AgentKind::RiskManager), repo, t0())
            .await
            .unwrap()
            .with_registry(registry.clone())
            .await;

        agent.transition(AgentStatus::Evolving).await.unwrap();

        let seen = registry.get(agent.agent_id()).await.unwrap();
        assert_eq!(seen.status(), AgentStatus::Evolving);
    }
}

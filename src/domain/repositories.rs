//! Repository Pattern Abstractions
//!
//! `AgentStateRepository` persists agent snapshots, one current snapshot per
//! `agent_id`, independently of the store that holds them.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edmas::domain::repositories::AgentStateRepository;
//! use edmas::infrastructure::persistence::DocumentAgentStateRepository;
//! use edmas::infrastructure::repositories::InMemoryDocumentStore;
//!
//! # async {
//! let repo = DocumentAgentStateRepository::new(Arc::new(InMemoryDocumentStore::new()));
//! let states = repo.list_all().await?;
//! # anyhow::Ok(())
//! # };
//! ```

use crate::domain::agent::state::AgentState;
use anyhow::Result;
use async_trait::async_trait;

/// Repository for persisting and retrieving agent state snapshots
#[async_trait]
pub trait AgentStateRepository: Send + Sync {
    /// Write the snapshot, replacing any previous one for the same agent
    async fn save(&self, state: &AgentState) -> Result<()>;

    /// Load the current snapshot. A stored document that cannot be decoded is
    /// returned as an error wrapping `MalformedRecordError`.
    async fn load(&self, agent_id: &str) -> Result<Option<AgentState>>;

    /// Returns true if a snapshot was removed
    async fn delete(&self, agent_id: &str) -> Result<bool>;

    /// All decodable snapshots
    async fn list_all(&self) -> Result<Vec<AgentState>>;
}

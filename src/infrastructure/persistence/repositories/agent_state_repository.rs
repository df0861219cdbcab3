use crate::domain::agent::codec::{StoreDocument, decode, encode};
use crate::domain::agent::state::AgentState;
use crate::domain::errors::MalformedRecordError;
use crate::domain::ports::DocumentStore;
use crate::domain::repositories::AgentStateRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_AGENT_COLLECTION: &str = "agent_states";

/// Agent state repository over any document store, one document per agent
pub struct DocumentAgentStateRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl DocumentAgentStateRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_collection(store, DEFAULT_AGENT_COLLECTION)
    }

    pub fn with_collection(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Decode a document and check that it belongs to the key it is stored under
fn decode_keyed(key: &str, document: &StoreDocument) -> Result<AgentState, MalformedRecordError> {
    let state = decode(document)?;
    if state.agent_id() != key {
        return Err(MalformedRecordError::KeyMismatch {
            key: key.to_string(),
            agent_id: state.agent_id().to_string(),
        });
    }
    Ok(state)
}

#[async_trait]
impl AgentStateRepository for DocumentAgentStateRepository {
    async fn save(&self, state: &AgentState) -> Result<()> {
        self.store
            .set(&self.collection, state.agent_id(), &encode(state))
            .await
            .with_context(|| format!("Failed to save agent state {}", state.agent_id()))?;

        debug!(
            "Saved snapshot for {} (status={}, heartbeat={})",
            state.agent_id(),
            state.status(),
            state.last_heartbeat()
        );
        Ok(())
    }

    async fn load(&self, agent_id: &str) -> Result<Option<AgentState>> {
        let Some(document) = self
            .store
            .get(&self.collection, agent_id)
            .await
            .with_context(|| format!("Failed to load agent state {}", agent_id))?
        else {
            return Ok(None);
        };

        let state = decode_keyed(agent_id, &document)
            .with_context(|| format!("Malformed agent state document for {}", agent_id))?;
        Ok(Some(state))
    }

    async fn delete(&self, agent_id: &str) -> Result<bool> {
        self.store
            .delete(&self.collection, agent_id)
            .await
            .with_context(|| format!("Failed to delete agent state {}", agent_id))
    }

    async fn list_all(&self) -> Result<Vec<AgentState>> {
        let documents = self
            .store
            .list(&self.collection)
            .await
            .context("Failed to list agent states")?;

        let mut states = Vec::with_capacity(documents.len());
        for (key, document) in documents {
            match decode_keyed(&key, &document) {
                Ok(state) => states.push(state),
                Err(e) => warn!("Skipping malformed agent state document {}: {}", key, e),
            }
        }
        Ok(states)
    }
}

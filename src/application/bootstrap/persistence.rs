use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{DEFAULT_PROJECT_ID, StoreEnvConfig};
use crate::domain::ports::DocumentStore;
use crate::domain::repositories::AgentStateRepository;
use crate::infrastructure::credentials::StoreCredentials;
use crate::infrastructure::persistence::{
    Database, DocumentAgentStateRepository, SqliteDocumentStore,
};

pub struct PersistenceHandle {
    pub db: Database,
    pub project_id: String,
    pub document_store: Arc<dyn DocumentStore>,
    pub agent_state_repository: Arc<dyn AgentStateRepository>,
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    pub async fn init(config: &StoreEnvConfig) -> Result<PersistenceHandle> {
        let project_id = Self::resolve_project(config)?;
        info!(
            "Initializing document store at {} (project {})",
            config.database_url, project_id
        );

        let db = Database::new(&config.database_url)
            .await
            .context("Failed to initialize database")?;

        let document_store: Arc<dyn DocumentStore> =
            Arc::new(SqliteDocumentStore::new(db.clone(), project_id.clone()));
        let agent_state_repository = Arc::new(DocumentAgentStateRepository::with_collection(
            document_store.clone(),
            config.agent_collection.clone(),
        ));

        Ok(PersistenceHandle {
            db,
            project_id,
            document_store,
            agent_state_repository,
        })
    }

    /// Project from credentials and configuration; they must agree when both are set.
    pub fn resolve_project(config: &StoreEnvConfig) -> Result<String> {
        match &config.credentials_path {
            Some(path) => {
                let credentials = StoreCredentials::from_file(path)?;
                credentials.resolve_project(config.project_id.as_deref())
            }
            None => Ok(config
                .project_id
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string())),
        }
    }
}

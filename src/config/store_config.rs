//! Document store configuration parsing from environment variables.

use crate::infrastructure::persistence::DEFAULT_AGENT_COLLECTION;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://edmas.db";
pub const DEFAULT_PROJECT_ID: &str = "edmas-local";

/// Document store environment configuration
#[derive(Debug, Clone)]
pub struct StoreEnvConfig {
    /// Explicit project id; falls back to the credentials' project
    pub project_id: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub database_url: String,
    pub agent_collection: String,
}

impl Default for StoreEnvConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            credentials_path: None,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            agent_collection: DEFAULT_AGENT_COLLECTION.to_string(),
        }
    }
}

impl StoreEnvConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        Self {
            project_id: non_empty("EDMAS_PROJECT_ID"),
            credentials_path: non_empty("EDMAS_CREDENTIALS_PATH").map(PathBuf::from),
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            agent_collection: non_empty("EDMAS_AGENT_COLLECTION")
                .unwrap_or_else(|| DEFAULT_AGENT_COLLECTION.to_string()),
        }
    }
}

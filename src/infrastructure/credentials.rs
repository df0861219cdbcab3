use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Service-account credential artifact for the document store.
///
/// Only the fields needed to identify the project are read; the rest of the
/// artifact is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCredentials {
    pub project_id: String,
    #[serde(default, rename = "type")]
    pub credential_type: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
}

impl StoreCredentials {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {:?}", path))?;
        let credentials = Self::from_json(&content)
            .with_context(|| format!("Invalid credentials file {:?}", path))?;

        info!(
            "Loaded credentials for project {} from {:?}",
            credentials.project_id, path
        );
        Ok(credentials)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let credentials: StoreCredentials =
            serde_json::from_str(content).context("Failed to parse credentials JSON")?;
        if credentials.project_id.trim().is_empty() {
            anyhow::bail!("Credentials project_id is empty");
        }
        Ok(credentials)
    }

    /// Project to use, given an optionally configured project id.
    ///
    /// A configured id must agree with the artifact's own project.
    pub fn resolve_project(&self, configured: Option<&str>) -> Result<String> {
        match configured {
            Some(project) if project != self.project_id => anyhow::bail!(
                "Configured project {} does not match credentials project {}",
                project,
                self.project_id
            ),
            _ => Ok(self.project_id.clone()),
        }
    }
}

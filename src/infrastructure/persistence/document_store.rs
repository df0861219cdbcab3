use crate::domain::agent::codec::StoreDocument;
use crate::domain::ports::DocumentStore;
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::debug;

/// Document store on SQLite, namespaced by project id.
///
/// Documents are kept as JSON text; a write is a single upsert, so the last
/// writer for a key wins.
pub struct SqliteDocumentStore {
    database: Database,
    project_id: String,
}

impl SqliteDocumentStore {
    pub fn new(database: Database, project_id: impl Into<String>) -> Self {
        Self {
            database,
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn parse_body(collection: &str, key: &str, body: &str) -> Result<StoreDocument> {
        serde_json::from_str(body)
            .with_context(|| format!("Stored document {}/{} is not a JSON object", collection, key))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<StoreDocument>> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE project_id = ? AND collection = ? AND key = ?",
        )
        .bind(&self.project_id)
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.database.pool)
        .await
        .context("Failed to load document")?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                Ok(Some(Self::parse_body(collection, key, &body)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, collection: &str, key: &str, document: &StoreDocument) -> Result<()> {
        let body = serde_json::to_string(document).context("Failed to serialize document")?;

        sqlx::query(
            r#"
            INSERT INTO documents (project_id, collection, key, body, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(project_id, collection, key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.project_id)
        .bind(collection)
        .bind(key)
        .bind(body)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.database.pool)
        .await
        .context("Failed to save document")?;

        debug!("Persisted document {}/{}", collection, key);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE project_id = ? AND collection = ? AND key = ?",
        )
        .bind(&self.project_id)
        .bind(collection)
        .bind(key)
        .execute(&self.database.pool)
        .await
        .context("Failed to delete document")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, StoreDocument)>> {
        let rows = sqlx::query(
            "SELECT key, body FROM documents WHERE project_id = ? AND collection = ? ORDER BY key ASC",
        )
        .bind(&self.project_id)
        .bind(collection)
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to list documents")?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key")?;
            let body: String = row.try_get("body")?;
            let document = Self::parse_body(collection, &key, &body)?;
            documents.push((key, document));
        }
        Ok(documents)
    }
}

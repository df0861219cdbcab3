use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        project_id TEXT NOT NULL,
        collection TEXT NOT NULL,
        key TEXT NOT NULL,
        body TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (project_id, collection, key)
    );
"#;

/// Shared SQLite pool backing the document store
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            prepare_parent_dir(db_url).await?;
        }

        let mut options = SqliteConnectOptions::from_str(db_url)
            .with_context(|| format!("Invalid database URL {}", db_url))?
            .create_if_missing(true);

        // Each connection to an in-memory database opens its own empty database,
        // so the pool holds exactly one connection and never recycles it.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open document database {}", db_url))?;
        info!("Document database ready at {}", db_url);

        let db = Self { pool };
        db.apply_schema().await?;
        Ok(db)
    }

    async fn apply_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .context("Failed to create documents table")?;
        debug!("documents table present");
        Ok(())
    }
}

async fn prepare_parent_dir(db_url: &str) -> Result<()> {
    let Some(file) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    match Path::new(file).parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create database directory {:?}", dir))
        }
        _ => Ok(()),
    }
}

use crate::domain::agent::codec::StoreDocument;
use anyhow::Result;
use async_trait::async_trait;

/// Keyed document store holding agent snapshots.
///
/// Each `set` is a single atomic document write. Concurrent writers to the same
/// key race and the store's last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<StoreDocument>>;

    async fn set(&self, collection: &str, key: &str, document: &StoreDocument) -> Result<()>;

    /// Returns true if a document was removed
    async fn delete(&self, collection: &str, key: &str) -> Result<bool>;

    /// All documents of a collection, ordered by key
    async fn list(&self, collection: &str) -> Result<Vec<(String, StoreDocument)>>;
}

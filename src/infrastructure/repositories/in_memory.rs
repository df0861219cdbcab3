//! In-Memory Document Store
//!
//! Thread-safe, in-memory implementation of the `DocumentStore` port.
//!
//! # Features
//!
//! - **Thread-safe**: Uses `Arc<RwLock>` for concurrent access
//! - **Testing**: Ideal for unit tests and running agents without a database
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - No sharing across processes

use crate::domain::agent::codec::StoreDocument;
use crate::domain::ports::DocumentStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type Collection = BTreeMap<String, StoreDocument>;

/// In-memory implementation of DocumentStore
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<StoreDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn set(&self, collection: &str, key: &str, document: &StoreDocument) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(key).is_some()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, StoreDocument)>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, doc)| (key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(n: u64) -> StoreDocument {
        let mut document = StoreDocument::new();
        document.insert("n".into(), json!(n));
        document
    }

    #[tokio::test]
    async fn test_document_store_save_and_retrieve() {
        let store = InMemoryDocumentStore::new();
        store.set("agents", "a", &doc(1)).await.unwrap();

        assert_eq!(store.get("agents", "a").await.unwrap(), Some(doc(1)));
        assert!(store.get("agents", "b").await.unwrap().is_none());
        assert!(store.get("other", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_store_overwrites() {
        let store = InMemoryDocumentStore::new();
        store.set("agents", "a", &doc(1)).await.unwrap();
        store.set("agents", "a", &doc(2)).await.unwrap();

        assert_eq!(store.count("agents").await, 1);
        assert_eq!(store.get("agents", "a").await.unwrap(), Some(doc(2)));
    }

    #[tokio::test]
    async fn test_document_store_list_and_delete() {
        let store = InMemoryDocumentStore::new();
        store.set("agents", "b", &doc(2)).await.unwrap();
        store.set("agents", "a", &doc(1)).await.unwrap();

        let listed = store.list("agents").await.unwrap();
        assert_eq!(listed[0].0, "a");
        assert_eq!(listed[1].0, "b");

        assert!(store.delete("agents", "a").await.unwrap());
        assert!(!store.delete("agents", "a").await.unwrap());
        assert!(!store.delete("missing", "a").await.unwrap());
        assert!(store.list("missing").await.unwrap().is_empty());
    }

    #[test]
    fn test_document_store_clones_share_state() {
        tokio_test::block_on(async {
            let store = InMemoryDocumentStore::new();
            let clone = store.clone();
            clone.set("agents", "a", &doc(1)).await.unwrap();
            assert_eq!(store.count("agents").await, 1);
        });
    }
}

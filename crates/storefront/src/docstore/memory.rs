//! In-memory document store for tests.
//!
//! Behaves like the hosted service from the consumer's point of view:
//! generated string ids, equality-only filtering, opaque field maps. A
//! failure can be injected to exercise error paths.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{DocStoreError, Document, DocumentStore};

/// In-memory [`DocumentStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, Vec<Document>>,
    failing: bool,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record with a chosen id, bypassing the trait (test setup).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.to_string(),
                fields,
            });
    }

    /// Make every subsequent operation fail with a 503, or restore service.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_failing(&self, failing: bool) {
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        state.failing = failing;
    }

    /// Number of records in a collection (test assertions).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        #[allow(clippy::unwrap_used)]
        let state = self.state.lock().unwrap();
        state.collections.get(collection).map_or(0, Vec::len)
    }

    /// Whether a collection is empty or absent.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check_available(state: &MemoryState) -> Result<(), DocStoreError> {
        if state.failing {
            return Err(DocStoreError::Status {
                status: 503,
                snippet: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocStoreError> {
        #[allow(clippy::unwrap_used)]
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.collections.get(collection).cloned().unwrap_or_default())
    }

    async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, DocStoreError> {
        #[allow(clippy::unwrap_used)]
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.fields.get(field).and_then(Value::as_str) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocStoreError> {
        #[allow(clippy::unwrap_used)]
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, DocStoreError> {
        #[allow(clippy::unwrap_used)]
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;

        let id = uuid::Uuid::new_v4().to_string();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect()
    }

    #[tokio::test]
    async fn test_seed_and_list_all() {
        let store = MemoryDocumentStore::new();
        store.seed("categories", "c1", fields(&[("name", "Tees")]));
        store.seed("categories", "c2", fields(&[("name", "Hoodies")]));

        let docs = store.list_all("categories").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "c1");
    }

    #[tokio::test]
    async fn test_list_where_equality_only() {
        let store = MemoryDocumentStore::new();
        store.seed("products", "p1", fields(&[("status", "Active")]));
        store.seed("products", "p2", fields(&[("status", "Inactive")]));

        let docs = store.list_where("products", "status", "Active").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "p1");
    }

    #[tokio::test]
    async fn test_get_by_id_absent_is_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.get_by_id("products", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_generates_distinct_ids() {
        let store = MemoryDocumentStore::new();
        let a = store.create("orders", Map::new()).await.unwrap();
        let b = store.create("orders", Map::new()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len("orders"), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let store = MemoryDocumentStore::new();
        store.set_failing(true);
        assert!(store.list_all("products").await.is_err());

        store.set_failing(false);
        assert!(store.list_all("products").await.is_ok());
    }
}

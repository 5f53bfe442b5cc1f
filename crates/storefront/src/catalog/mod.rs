//! The catalog data cache.
//!
//! The full set of categories, subcategories, and active products is
//! fetched once per session - three reads fanned out in parallel and
//! joined before anything is published. Consumers only ever observe a
//! fully-populated snapshot or a fully-errored cache, never a mix of
//! fresh products against stale subcategories. Every page reads from the
//! snapshot instead of fetching remotely.
//!
//! The cache is an explicitly constructed service with a lifecycle:
//! [`CatalogCache::initialize`] moves it `Loading` -> `Ready`/`Error`,
//! [`CatalogCache::refetch`] replaces the entire snapshot, and
//! [`CatalogCache::dispose`] returns it to `Uninitialized`. Accessors on
//! anything but a `Ready` cache return empty results; the error state
//! carries a message for a retry UI.

mod conversions;

use std::sync::{Arc, RwLock};

use husk_threads_core::{CategoryId, ProductId, ProductStatus, SubcategoryId};
use tracing::{error, info, instrument};

use crate::docstore::{DocStoreError, DocumentStore};
use crate::types::{Category, Product, Subcategory};

/// Collection names in the hosted store.
const CATEGORIES: &str = "categories";
const SUBCATEGORIES: &str = "subcategories";
const PRODUCTS: &str = "products";

/// Observable lifecycle state of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    /// `initialize` has not been called yet.
    Uninitialized,
    /// A fetch is in flight; nothing is published yet.
    Loading,
    /// A complete snapshot is available.
    Ready,
    /// The last fetch failed; `refetch` recovers.
    Error,
}

/// A complete, immutable catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// All categories.
    pub categories: Vec<Category>,
    /// All subcategories.
    pub subcategories: Vec<Subcategory>,
    /// All active products, in store order.
    pub products: Vec<Product>,
}

enum State {
    Uninitialized,
    Loading,
    Ready(Arc<CatalogSnapshot>),
    Error(String),
}

/// Process-wide catalog cache over the hosted document store.
///
/// Cheaply cloneable; all clones observe the same state.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CatalogCacheInner>,
}

struct CatalogCacheInner {
    store: Arc<dyn DocumentStore>,
    state: RwLock<State>,
}

impl CatalogCache {
    /// Create an uninitialized cache over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(CatalogCacheInner {
                store,
                state: RwLock::new(State::Uninitialized),
            }),
        }
    }

    fn set_state(&self, state: State) {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = state;
    }

    /// Fetch the three collections in parallel and publish a snapshot.
    ///
    /// The reads race with no ordering guarantee; the snapshot is only
    /// swapped in once all three have succeeded. Any failure leaves the
    /// cache in the error state with nothing published.
    ///
    /// # Errors
    ///
    /// Returns the first `DocStoreError` encountered; the same signal is
    /// observable through [`Self::status`]/[`Self::error`] for a retry UI.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), DocStoreError> {
        self.set_state(State::Loading);

        let store = &self.inner.store;
        let fetched = tokio::try_join!(
            store.list_all(CATEGORIES),
            store.list_all(SUBCATEGORIES),
            store.list_where(PRODUCTS, "status", ProductStatus::Active.as_str()),
        );

        match fetched {
            Ok((categories, subcategories, products)) => {
                let snapshot = CatalogSnapshot {
                    categories: conversions::project_collection(categories, CATEGORIES),
                    subcategories: conversions::project_collection(subcategories, SUBCATEGORIES),
                    products: conversions::project_collection(products, PRODUCTS),
                };
                info!(
                    categories = snapshot.categories.len(),
                    subcategories = snapshot.subcategories.len(),
                    products = snapshot.products.len(),
                    "Catalog fetched"
                );
                self.set_state(State::Ready(Arc::new(snapshot)));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Catalog fetch failed");
                self.set_state(State::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Replace the entire cached snapshot with a fresh fetch.
    ///
    /// # Errors
    ///
    /// Same as [`Self::initialize`].
    pub async fn refetch(&self) -> Result<(), DocStoreError> {
        self.initialize().await
    }

    /// Drop the snapshot and return to the uninitialized state.
    pub fn dispose(&self) {
        self.set_state(State::Uninitialized);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match *guard {
            State::Uninitialized => CatalogStatus::Uninitialized,
            State::Loading => CatalogStatus::Loading,
            State::Ready(_) => CatalogStatus::Ready,
            State::Error(_) => CatalogStatus::Error,
        }
    }

    /// The last fetch error, when in the error state.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match &*guard {
            State::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// The published snapshot, `None` unless ready.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match &*guard {
            State::Ready(snapshot) => Some(Arc::clone(snapshot)),
            _ => None,
        }
    }

    /// All active products; empty unless ready.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.snapshot()
            .map(|s| s.products.clone())
            .unwrap_or_default()
    }

    /// All categories; empty unless ready.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.snapshot()
            .map(|s| s.categories.clone())
            .unwrap_or_default()
    }

    /// All subcategories; empty unless ready.
    #[must_use]
    pub fn subcategories(&self) -> Vec<Subcategory> {
        self.snapshot()
            .map(|s| s.subcategories.clone())
            .unwrap_or_default()
    }

    /// Look up a product by id; `None` when absent or the cache is not ready.
    #[must_use]
    pub fn product_by_id(&self, id: &ProductId) -> Option<Product> {
        self.snapshot()?
            .products
            .iter()
            .find(|p| p.id == *id)
            .cloned()
    }

    /// Products whose category matches `category_id`; empty unless ready.
    #[must_use]
    pub fn products_by_category(&self, category_id: &CategoryId) -> Vec<Product> {
        self.snapshot().map_or_else(Vec::new, |s| {
            s.products
                .iter()
                .filter(|p| p.category_id == *category_id)
                .cloned()
                .collect()
        })
    }

    /// Products whose subcategory matches `subcategory_id`; empty unless ready.
    #[must_use]
    pub fn products_by_subcategory(&self, subcategory_id: &SubcategoryId) -> Vec<Product> {
        self.snapshot().map_or_else(Vec::new, |s| {
            s.products
                .iter()
                .filter(|p| p.subcategory_id.as_ref() == Some(subcategory_id))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::docstore::memory::MemoryDocumentStore;
    use crate::docstore::Document;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn seeded_store() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store.seed("categories", "c1", fields(json!({"name": "Tees", "imageUrl": "u1"})));
        store.seed("categories", "c2", fields(json!({"name": "Hoodies", "imageUrl": "u2"})));
        store.seed(
            "subcategories",
            "s1",
            fields(json!({"name": "Graphic", "categoryId": "c1"})),
        );
        store.seed(
            "products",
            "p1",
            fields(json!({
                "name": "Graphic Tee",
                "price": 1000,
                "discountPrice": 800,
                "categoryId": "c1",
                "subcategoryId": "s1",
                "status": "Active",
            })),
        );
        store.seed(
            "products",
            "p2",
            fields(json!({
                "name": "Plain Hoodie",
                "price": 1500,
                "categoryId": "c2",
                "status": "Active",
            })),
        );
        store.seed(
            "products",
            "p3",
            fields(json!({
                "name": "Retired Tee",
                "price": 300,
                "categoryId": "c1",
                "status": "Inactive",
            })),
        );
        store
    }

    #[tokio::test]
    async fn test_initialize_publishes_complete_snapshot() {
        let cache = CatalogCache::new(Arc::new(seeded_store()));
        assert_eq!(cache.status(), CatalogStatus::Uninitialized);

        cache.initialize().await.unwrap();

        assert_eq!(cache.status(), CatalogStatus::Ready);
        assert_eq!(cache.categories().len(), 2);
        assert_eq!(cache.subcategories().len(), 1);
        // Only active products are fetched
        assert_eq!(cache.products().len(), 2);
    }

    #[tokio::test]
    async fn test_accessors_before_initialize_are_empty() {
        let cache = CatalogCache::new(Arc::new(seeded_store()));

        assert!(cache.products().is_empty());
        assert!(cache.categories().is_empty());
        assert!(cache.product_by_id(&ProductId::new("p1")).is_none());
    }

    #[tokio::test]
    async fn test_lookup_accessors() {
        let cache = CatalogCache::new(Arc::new(seeded_store()));
        cache.initialize().await.unwrap();

        let product = cache.product_by_id(&ProductId::new("p1")).unwrap();
        assert_eq!(product.name, "Graphic Tee");

        assert!(cache.product_by_id(&ProductId::new("missing")).is_none());

        let in_c1 = cache.products_by_category(&CategoryId::new("c1"));
        assert_eq!(in_c1.len(), 1);

        let in_s1 = cache.products_by_subcategory(&SubcategoryId::new("s1"));
        assert_eq!(in_s1.len(), 1);
        assert_eq!(in_s1[0].id, ProductId::new("p1"));
    }

    #[tokio::test]
    async fn test_fetch_failure_enters_error_state_with_empty_accessors() {
        let store = Arc::new(seeded_store());
        store.set_failing(true);
        let cache = CatalogCache::new(Arc::clone(&store) as Arc<dyn DocumentStore>);

        assert!(cache.initialize().await.is_err());
        assert_eq!(cache.status(), CatalogStatus::Error);
        assert!(cache.error().is_some());
        assert!(cache.products().is_empty());
        assert!(cache.categories().is_empty());
    }

    #[tokio::test]
    async fn test_refetch_recovers_from_error() {
        let store = Arc::new(seeded_store());
        store.set_failing(true);
        let cache = CatalogCache::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        assert!(cache.initialize().await.is_err());

        store.set_failing(false);
        cache.refetch().await.unwrap();

        assert_eq!(cache.status(), CatalogStatus::Ready);
        assert_eq!(cache.products().len(), 2);
        assert!(cache.error().is_none());
    }

    /// Store that succeeds for some collections and fails for products.
    struct PartialFailStore {
        inner: MemoryDocumentStore,
    }

    #[async_trait]
    impl DocumentStore for PartialFailStore {
        async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocStoreError> {
            self.inner.list_all(collection).await
        }

        async fn list_where(
            &self,
            _collection: &str,
            _field: &str,
            _value: &str,
        ) -> Result<Vec<Document>, DocStoreError> {
            Err(DocStoreError::Status {
                status: 500,
                snippet: "products shard down".to_string(),
            })
        }

        async fn get_by_id(
            &self,
            collection: &str,
            id: &str,
        ) -> Result<Option<Document>, DocStoreError> {
            self.inner.get_by_id(collection, id).await
        }

        async fn create(
            &self,
            collection: &str,
            fields: Map<String, Value>,
        ) -> Result<String, DocStoreError> {
            self.inner.create(collection, fields).await
        }
    }

    #[tokio::test]
    async fn test_no_partial_success_state() {
        // Categories and subcategories fetch fine; products fail. The cache
        // must publish nothing rather than a cross-referenced partial view.
        let cache = CatalogCache::new(Arc::new(PartialFailStore {
            inner: seeded_store(),
        }));

        assert!(cache.initialize().await.is_err());
        assert_eq!(cache.status(), CatalogStatus::Error);
        assert!(cache.categories().is_empty());
        assert!(cache.subcategories().is_empty());
        assert!(cache.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_refetch_replaces_whole_snapshot() {
        let store = Arc::new(seeded_store());
        let cache = CatalogCache::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        cache.initialize().await.unwrap();
        assert_eq!(cache.products().len(), 2);

        store.seed(
            "products",
            "p4",
            fields(json!({
                "name": "New Drop",
                "price": 700,
                "categoryId": "c1",
                "status": "Active",
            })),
        );
        cache.refetch().await.unwrap();

        assert_eq!(cache.products().len(), 3);
    }

    #[tokio::test]
    async fn test_dispose_returns_to_uninitialized() {
        let cache = CatalogCache::new(Arc::new(seeded_store()));
        cache.initialize().await.unwrap();
        cache.dispose();

        assert_eq!(cache.status(), CatalogStatus::Uninitialized);
        assert!(cache.products().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_product_is_skipped_not_fatal() {
        let store = seeded_store();
        // price has an impossible shape; projection skips this record
        store.seed(
            "products",
            "bad",
            fields(json!({
                "name": "Broken",
                "price": {"nested": true},
                "categoryId": "c1",
                "status": "Active",
            })),
        );
        let cache = CatalogCache::new(Arc::new(store));
        cache.initialize().await.unwrap();

        assert_eq!(cache.status(), CatalogStatus::Ready);
        assert_eq!(cache.products().len(), 2);
    }
}

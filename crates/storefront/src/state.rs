//! Application state shared across views.
//!
//! The composition root: wires configuration into the production clients
//! and hands every view the same catalog cache and cart store. Services
//! are injected explicitly - nothing reaches for ambient globals.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::CatalogCache;
use crate::config::StorefrontConfig;
use crate::custom::CustomOrderService;
use crate::docstore::{DocumentStore, RestDocumentStore};
use crate::error::AppError;
use crate::kv::{FileKeyValueStore, KeyValueStore};
use crate::uploads::{CloudUploader, Uploader};

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shared catalog cache, cart store, and remote clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    docstore: Arc<dyn DocumentStore>,
    uploader: Arc<dyn Uploader>,
    catalog: CatalogCache,
    cart: CartStore,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// Opens the persisted-state directory, rehydrates the cart, and
    /// constructs the remote clients. The catalog starts uninitialized;
    /// call [`CatalogCache::initialize`] at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let docstore: Arc<dyn DocumentStore> = Arc::new(RestDocumentStore::new(&config.docstore));
        let uploader: Arc<dyn Uploader> = Arc::new(CloudUploader::new(&config.uploads));

        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(&config.state_dir)?);

        let catalog = CatalogCache::new(Arc::clone(&docstore));
        let cart = CartStore::open(kv);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                docstore,
                uploader,
                catalog,
                cart,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the document store client.
    #[must_use]
    pub fn docstore(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.inner.docstore)
    }

    /// Get a reference to the catalog cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Build the custom-order submission service.
    #[must_use]
    pub fn custom_orders(&self) -> CustomOrderService {
        CustomOrderService::new(
            Arc::clone(&self.inner.docstore),
            Arc::clone(&self.inner.uploader),
        )
    }
}

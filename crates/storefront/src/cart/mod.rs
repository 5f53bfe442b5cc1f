//! The shopping cart store.
//!
//! Lines are keyed by the identity triple `(product, size, color)`: adding
//! the same triple again merges quantities into the existing line, and the
//! first add's denormalized snapshot (name, prices, image) wins. Insertion
//! order is preserved for display.
//!
//! Every mutation serializes the whole line collection to a durable
//! [`KeyValueStore`] slot before releasing the store lock, so a concurrent
//! reader can never observe a mutation that is not yet persisted. On
//! startup the slot is rehydrated; absent or malformed contents fail open
//! to an empty cart.

use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use tracing::warn;

use crate::kv::KeyValueStore;
use crate::types::{CartLine, LineKey};

/// The durable slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "huskthreads_cart";

/// Persistent store of cart lines with derived totals.
///
/// Cheaply cloneable; all clones share the same line collection and
/// persistence slot.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    lines: Mutex<Vec<CartLine>>,
    kv: Arc<dyn KeyValueStore>,
}

impl CartStore {
    /// Open the cart, rehydrating any previously persisted lines.
    ///
    /// A missing or malformed slot seeds an empty cart - a broken slot must
    /// never take down startup.
    #[must_use]
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let lines = match kv.get(CART_STORAGE_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(error = %e, "Discarding malformed persisted cart");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Self {
            inner: Arc::new(CartStoreInner {
                lines: Mutex::new(lines),
                kv,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLine>> {
        // A poisoned lock means another holder panicked mid-mutation; the
        // line collection itself is still last-write consistent
        self.inner
            .lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Serialize the full collection into the durable slot.
    ///
    /// Called with the store lock held so the mutation and its persisted
    /// snapshot are atomic with respect to other readers. A write failure
    /// keeps the in-memory cart authoritative for the session.
    fn persist(&self, lines: &[CartLine]) {
        let serialized = match serde_json::to_string(lines) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.inner.kv.set(CART_STORAGE_KEY, &serialized) {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a line to the cart.
    ///
    /// If a line with the same identity triple exists its quantity grows by
    /// the incoming quantity; the existing snapshot is kept even when the
    /// incoming line carries different prices or images. Otherwise the line
    /// is appended.
    pub fn add(&self, line: CartLine) {
        let mut lines = self.lock();
        let key = line.key();
        if let Some(existing) = lines.iter_mut().find(|l| l.key() == key) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            lines.push(line);
        }
        self.persist(&lines);
    }

    /// Remove the line matching the identity triple. No-op when absent.
    pub fn remove(&self, key: &LineKey) {
        let mut lines = self.lock();
        let before = lines.len();
        lines.retain(|l| l.key() != *key);
        if lines.len() != before {
            self.persist(&lines);
        }
    }

    /// Set the quantity of the line matching the identity triple.
    ///
    /// A quantity of zero removes the line, identically to [`Self::remove`].
    /// No-op when the line is absent. All other attributes are untouched.
    pub fn set_quantity(&self, key: &LineKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
            return;
        }

        let mut lines = self.lock();
        if let Some(line) = lines.iter_mut().find(|l| l.key() == *key) {
            line.quantity = quantity;
            self.persist(&lines);
        }
    }

    /// Empty the cart. Called on successful checkout.
    pub fn clear(&self) {
        let mut lines = self.lock();
        lines.clear();
        self.persist(&lines);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().clone()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cart subtotal: effective price times quantity, summed over lines.
    ///
    /// Recomputed on every read - a pure projection of the line collection,
    /// never cached separately.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().iter().map(CartLine::subtotal).sum()
    }

    /// Total unit count across lines (badge displays).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lock().iter().map(|l| l.quantity).sum()
    }
}

//! Checkout submission.
//!
//! Assembles an order from the current cart snapshot and writes it to the
//! hosted store as a single create. The cart is only cleared on success;
//! a failed submission leaves cart and form untouched for an explicit
//! retry - nothing retries automatically.

use std::sync::Arc;

use chrono::Utc;
use husk_threads_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};

use crate::cart::CartStore;
use crate::docstore::{DocStoreError, DocumentStore};
use crate::types::{Order, OrderLine, ShippingAddress};

/// Collection the order record is written to.
const ORDERS: &str = "orders";

/// Orders at or above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: u32 = 999;

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: u32 = 99;

/// Shipping fee for a cart subtotal.
#[must_use]
pub fn shipping_fee(subtotal: Decimal) -> Decimal {
    if subtotal >= Decimal::from(FREE_SHIPPING_THRESHOLD) {
        Decimal::ZERO
    } else {
        Decimal::from(FLAT_SHIPPING_FEE)
    }
}

/// Errors from checkout submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; callers route back to the cart view instead
    /// of rendering the form.
    #[error("Cart is empty")]
    EmptyCart,

    /// A required form field is blank; no remote call was attempted.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// This flow already placed an order; the confirmation view owns it.
    #[error("Order already placed: {0}")]
    AlreadySubmitted(OrderId),

    /// The order record could not be serialized.
    #[error("Failed to serialize order: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The hosted store rejected the write; retryable.
    #[error("Order submission failed: {0}")]
    Store(#[from] DocStoreError),
}

/// The shipping/payment form a buyer fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            customer_phone: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "India".to_string(),
            payment_method: PaymentMethod::Cod,
        }
    }
}

impl CheckoutForm {
    /// Check that every required field is non-blank.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required: [(&'static str, &str); 6] = [
            ("customerName", &self.customer_name),
            ("customerPhone", &self.customer_phone),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(name));
            }
        }
        Ok(())
    }

    fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            country: self.country.clone(),
        }
    }
}

/// One checkout attempt over a cart.
///
/// After a successful submission the flow holds the order id and refuses
/// further submissions - the form view is replaced by a confirmation view
/// keyed on [`CheckoutFlow::order_id`].
pub struct CheckoutFlow {
    store: Arc<dyn DocumentStore>,
    cart: CartStore,
    order_id: Option<OrderId>,
}

impl CheckoutFlow {
    /// Start a checkout over the given cart.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, cart: CartStore) -> Self {
        Self {
            store,
            cart,
            order_id: None,
        }
    }

    /// The placed order, once submission succeeded.
    #[must_use]
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    /// Subtotal, fee, and grand total for the current cart (display data).
    #[must_use]
    pub fn totals(&self) -> (Decimal, Decimal, Decimal) {
        let subtotal = self.cart.total();
        let fee = shipping_fee(subtotal);
        (subtotal, fee, subtotal + fee)
    }

    /// Validate the form and submit the order.
    ///
    /// On success the cart is cleared and the order id retained. On failure
    /// the cart and form state are untouched and the caller may re-trigger
    /// submission explicitly.
    ///
    /// # Errors
    ///
    /// `EmptyCart` and `MissingField` block before any remote call;
    /// `Store` means the write failed and can be retried;
    /// `AlreadySubmitted` guards against double submission.
    #[instrument(skip(self, form))]
    pub async fn submit(&mut self, form: &CheckoutForm) -> Result<OrderId, CheckoutError> {
        if let Some(id) = &self.order_id {
            return Err(CheckoutError::AlreadySubmitted(id.clone()));
        }

        let lines = self.cart.lines();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        form.validate()?;

        // Effective prices come from the cart snapshot, not a live catalog
        // re-read; the snapshot is what the buyer saw.
        let subtotal: Decimal = lines.iter().map(crate::types::CartLine::subtotal).sum();
        let total_amount = subtotal + shipping_fee(subtotal);

        let order = Order {
            customer_name: form.customer_name.clone(),
            customer_phone: form.customer_phone.clone(),
            shipping_address: form.shipping_address(),
            products: lines.iter().map(OrderLine::from).collect(),
            total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: form.payment_method,
            created_at: Utc::now(),
        };

        let Value::Object(fields) = serde_json::to_value(&order)? else {
            // An Order always serializes to an object
            return Err(CheckoutError::Serialize(serde::ser::Error::custom(
                "order did not serialize to an object",
            )));
        };

        let id = self.store.create(ORDERS, fields).await?;
        self.cart.clear();

        let order_id = OrderId::new(id);
        info!(order_id = %order_id, total = %total_amount, "Order placed");
        self.order_id = Some(order_id.clone());
        Ok(order_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use husk_threads_core::{CategoryId, ProductId, ProductStatus};

    use super::*;
    use crate::docstore::memory::MemoryDocumentStore;
    use crate::kv::MemoryKeyValueStore;
    use crate::types::{CartLine, Product};

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn product(id: &str, price: i64, discount: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: dec(price),
            discount_price: discount.map(dec),
            images: vec![format!("https://img.example/{id}.jpg")],
            colors: vec!["Black".to_string()],
            sizes: vec!["M".to_string()],
            stock: 10,
            status: ProductStatus::Active,
            category_id: CategoryId::new("c1"),
            subcategory_id: None,
            description: String::new(),
            sku: String::new(),
            tags: None,
        }
    }

    fn cart_with(lines: &[CartLine]) -> CartStore {
        let cart = CartStore::open(Arc::new(MemoryKeyValueStore::new()));
        for line in lines {
            cart.add(line.clone());
        }
        cart
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            customer_name: "Asha Rao".to_string(),
            customer_phone: "+91 98765 43210".to_string(),
            street: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            zip_code: "560001".to_string(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_shipping_fee_threshold() {
        assert_eq!(shipping_fee(dec(950)), dec(99));
        assert_eq!(shipping_fee(dec(998)), dec(99));
        assert_eq!(shipping_fee(dec(999)), Decimal::ZERO);
        assert_eq!(shipping_fee(dec(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut form = valid_form();
        form.city = "  ".to_string();
        let err = form.validate().unwrap_err();
        assert!(matches!(err, CheckoutError::MissingField("city")));

        assert!(valid_form().validate().is_ok());
    }

    #[tokio::test]
    async fn test_empty_cart_blocks_before_any_remote_call() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[]);
        let mut flow = CheckoutFlow::new(Arc::clone(&store) as Arc<dyn DocumentStore>, cart);

        let err = flow.submit(&valid_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(store.is_empty("orders"));
    }

    #[tokio::test]
    async fn test_validation_failure_blocks_before_any_remote_call() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[CartLine::from_product(&product("p1", 500, None), "M", "Black", 1)]);
        let mut flow = CheckoutFlow::new(Arc::clone(&store) as Arc<dyn DocumentStore>, cart.clone());

        let err = flow.submit(&CheckoutForm::default()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingField("customerName")));
        assert!(store.is_empty("orders"));
        assert_eq!(cart.count(), 1);
    }

    #[tokio::test]
    async fn test_successful_submission_clears_cart_and_keys_confirmation() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[
            CartLine::from_product(&product("p1", 1000, Some(800)), "M", "Black", 1),
            CartLine::from_product(&product("p2", 150, None), "L", "White", 1),
        ]);
        let mut flow = CheckoutFlow::new(Arc::clone(&store) as Arc<dyn DocumentStore>, cart.clone());

        let order_id = flow.submit(&valid_form()).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(flow.order_id(), Some(&order_id));
        assert_eq!(store.len("orders"), 1);

        let doc = store
            .get_by_id("orders", order_id.as_str())
            .await
            .unwrap()
            .unwrap();
        // Subtotal 800 + 150 = 950 is under the threshold: fee 99
        assert_eq!(doc.fields["totalAmount"], "1049");
        assert_eq!(doc.fields["status"], "Pending");
        assert_eq!(doc.fields["paymentStatus"], "Pending");
        assert_eq!(doc.fields["paymentMethod"], "COD");
        // Order lines carry the effective price
        assert_eq!(doc.fields["products"][0]["price"], "800");
    }

    #[tokio::test]
    async fn test_free_shipping_at_threshold() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[CartLine::from_product(&product("p1", 1000, None), "M", "Black", 1)]);
        let mut flow = CheckoutFlow::new(Arc::clone(&store) as Arc<dyn DocumentStore>, cart);

        let order_id = flow.submit(&valid_form()).await.unwrap();
        let doc = store
            .get_by_id("orders", order_id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["totalAmount"], "1000");
    }

    #[tokio::test]
    async fn test_failed_submission_preserves_cart_and_allows_retry() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[CartLine::from_product(&product("p1", 500, None), "M", "Black", 2)]);
        let mut flow = CheckoutFlow::new(Arc::clone(&store) as Arc<dyn DocumentStore>, cart.clone());

        store.set_failing(true);
        let err = flow.submit(&valid_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Store(_)));
        assert_eq!(cart.count(), 2);
        assert!(flow.order_id().is_none());

        // The user re-triggers submission explicitly once the store is back
        store.set_failing(false);
        let order_id = flow.submit(&valid_form()).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(flow.order_id(), Some(&order_id));
    }

    #[tokio::test]
    async fn test_resubmission_is_refused() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[CartLine::from_product(&product("p1", 500, None), "M", "Black", 1)]);
        let mut flow = CheckoutFlow::new(Arc::clone(&store) as Arc<dyn DocumentStore>, cart.clone());

        flow.submit(&valid_form()).await.unwrap();

        // Even with a refilled cart, this flow will not submit twice
        cart.add(CartLine::from_product(&product("p2", 700, None), "M", "Black", 1));
        let err = flow.submit(&valid_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AlreadySubmitted(_)));
        assert_eq!(store.len("orders"), 1);
    }

    #[tokio::test]
    async fn test_totals_for_display() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cart = cart_with(&[CartLine::from_product(&product("p1", 950, None), "M", "Black", 1)]);
        let flow = CheckoutFlow::new(store, cart);

        let (subtotal, fee, total) = flow.totals();
        assert_eq!(subtotal, dec(950));
        assert_eq!(fee, dec(99));
        assert_eq!(total, dec(1049));
    }
}

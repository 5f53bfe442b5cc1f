//! Domain types for the Husk Threads storefront.
//!
//! These types are the typed projections of the hosted store's opaque
//! records. Field names follow the collections' camelCase wire names so a
//! record round-trips byte-for-byte where it matters (the persisted cart
//! slot, order writes).

use chrono::{DateTime, Utc};
use husk_threads_core::{
    CategoryId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, ProductStatus, SubcategoryId,
    discount_percent, effective_price,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product in the store.
///
/// Immutable snapshot of the remote record; the storefront never writes
/// products back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Base price.
    pub price: Decimal,
    /// Optional discount price. Only discounts strictly below `price` count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    /// Image URLs, display order significant.
    #[serde(default)]
    pub images: Vec<String>,
    /// Available colors.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Available sizes, display order significant.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Lifecycle status. The storefront only ever fetches `Active`.
    #[serde(default)]
    pub status: ProductStatus,
    /// Owning category.
    pub category_id: CategoryId,
    /// Optional subcategory within the category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Stock-keeping unit.
    #[serde(default)]
    pub sku: String,
    /// Optional tags, matched by the text search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Product {
    /// The price a buyer pays: discount price when genuinely discounted,
    /// base price otherwise.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        effective_price(self.price, self.discount_price)
    }

    /// Whole-number discount percentage for the "N% OFF" badge, absent
    /// when there is no genuine discount.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        discount_percent(self.price, self.discount_price)
    }

    /// First image, used wherever a single thumbnail is shown.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A top-level category with its banner image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Banner image URL.
    #[serde(default)]
    pub image_url: String,
}

/// A subcategory nested under a [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    /// Document ID.
    pub id: SubcategoryId,
    /// Display name.
    pub name: String,
    /// Parent category.
    pub category_id: CategoryId,
}

// =============================================================================
// Cart Types
// =============================================================================

/// The uniqueness key for a cart line: `(product, size, color)`.
///
/// Two adds of the same product in different sizes produce two lines; two
/// adds with the same triple merge into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Chosen size.
    pub size: String,
    /// Chosen color.
    pub color: String,
}

/// A line item in the cart.
///
/// Everything except `quantity` is a denormalized snapshot captured when
/// the line was first added; later price or name changes in the catalog do
/// not flow into existing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Base price at add time.
    pub price: Decimal,
    /// Discount price at add time, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    /// Units of this line. Always positive; driving it to zero removes the line.
    pub quantity: u32,
    /// Chosen size.
    pub size: String,
    /// Chosen color.
    pub color: String,
    /// Thumbnail URL at add time.
    #[serde(default)]
    pub image: String,
}

impl CartLine {
    /// Build a line from a catalog product and the buyer's selections,
    /// snapshotting the display fields.
    #[must_use]
    pub fn from_product(
        product: &Product,
        size: impl Into<String>,
        color: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            discount_price: product.discount_price,
            quantity,
            size: size.into(),
            color: color.into(),
            image: product.primary_image().unwrap_or_default().to_string(),
        }
    }

    /// The identity triple for merge/remove/update operations.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Per-unit price the buyer pays for this line.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        effective_price(self.price, self.discount_price)
    }

    /// Line subtotal: effective price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.effective_price() * Decimal::from(self.quantity)
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// Shipping destination captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A purchased line as recorded on an order.
///
/// `price` is the effective per-unit price at submission time - the order
/// does not keep the base/discount split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    #[serde(default)]
    pub image: String,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.effective_price(),
            quantity: line.quantity,
            size: line.size.clone(),
            color: line.color.clone(),
            image: line.image.clone(),
        }
    }
}

/// An order record, written once per checkout submission and never read
/// back by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    /// Cart line snapshots at submission time.
    pub products: Vec<OrderLine>,
    /// Grand total: subtotal plus shipping fee.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Custom Order Types
// =============================================================================

/// A made-to-order request with a customer-supplied design.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrder {
    pub customer_name: String,
    pub customer_phone: String,
    /// Garment to print on (e.g. "T-shirt", "Hoodie").
    pub product_type: String,
    pub color: String,
    /// Requested sizes; at least one.
    pub sizes: Vec<String>,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
    /// Original file name of the uploaded design.
    pub design_file_name: String,
    /// Public URL of the uploaded design.
    pub design_url: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn sample_product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Graphic Tee".to_string(),
            price: dec(1000),
            discount_price: Some(dec(800)),
            images: vec!["https://img.example/tee-front.jpg".to_string()],
            colors: vec!["Black".to_string(), "White".to_string()],
            sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            stock: 12,
            status: ProductStatus::Active,
            category_id: CategoryId::new("c1"),
            subcategory_id: Some(SubcategoryId::new("s1")),
            description: "Soft cotton tee".to_string(),
            sku: "HT-TEE-001".to_string(),
            tags: Some(vec!["cotton".to_string(), "summer".to_string()]),
        }
    }

    #[test]
    fn test_effective_price_and_badge() {
        let mut product = sample_product();
        assert_eq!(product.effective_price(), dec(800));
        assert_eq!(product.discount_percent(), Some(20));

        // A "discount" at or above base price has no effect
        product.discount_price = Some(dec(1200));
        assert_eq!(product.effective_price(), dec(1000));
        assert_eq!(product.discount_percent(), None);
    }

    #[test]
    fn test_cart_line_from_product_snapshots_display_fields() {
        let product = sample_product();
        let line = CartLine::from_product(&product, "M", "Black", 2);

        assert_eq!(line.key(), LineKey {
            product_id: ProductId::new("p1"),
            size: "M".to_string(),
            color: "Black".to_string(),
        });
        assert_eq!(line.name, "Graphic Tee");
        assert_eq!(line.image, "https://img.example/tee-front.jpg");
        assert_eq!(line.subtotal(), dec(1600));
    }

    #[test]
    fn test_cart_line_wire_names_are_camel_case() {
        let product = sample_product();
        let line = CartLine::from_product(&product, "M", "Black", 1);
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(json["productId"], "p1");
        assert_eq!(json["discountPrice"], "800");
        assert!(json.get("discount_price").is_none());
    }

    #[test]
    fn test_product_projection_tolerates_missing_optionals() {
        let raw = serde_json::json!({
            "id": "p9",
            "name": "Plain Polo",
            "price": 499,
            "categoryId": "c1",
        });
        let product: Product = serde_json::from_value(raw).unwrap();

        assert_eq!(product.discount_price, None);
        assert!(product.images.is_empty());
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.stock, 0);
        assert_eq!(product.effective_price(), dec(499));
    }

    #[test]
    fn test_order_line_captures_effective_price() {
        let product = sample_product();
        let line = CartLine::from_product(&product, "L", "White", 3);
        let order_line = OrderLine::from(&line);

        assert_eq!(order_line.price, dec(800));
        assert_eq!(order_line.quantity, 3);
    }
}

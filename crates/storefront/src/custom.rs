//! Custom-order submission.
//!
//! A made-to-order request: the customer's design is uploaded to the file
//! service first, then a record carrying the returned URL is written to
//! the `customOrders` collection. Failure semantics match checkout - the
//! form is preserved and the user retries explicitly.

use std::sync::Arc;

use chrono::Utc;
use husk_threads_core::{CustomOrderId, OrderStatus};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};

use crate::docstore::{DocStoreError, DocumentStore};
use crate::types::CustomOrder;
use crate::uploads::{UploadError, UploadFile, Uploader};

/// Collection the custom-order record is written to.
const CUSTOM_ORDERS: &str = "customOrders";

/// Errors from custom-order submission.
#[derive(Debug, Error)]
pub enum CustomOrderError {
    /// A required form field is blank; no remote call was attempted.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// No size was selected.
    #[error("Select at least one size")]
    NoSizes,

    /// Quantity must be at least one.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// The design upload failed.
    #[error("Design upload failed: {0}")]
    Upload(#[from] UploadError),

    /// The hosted store rejected the write; retryable.
    #[error("Custom order submission failed: {0}")]
    Store(#[from] DocStoreError),

    /// The record could not be serialized.
    #[error("Failed to serialize custom order: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The customization form a buyer fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomOrderForm {
    pub customer_name: String,
    pub customer_phone: String,
    /// Garment to print on.
    pub product_type: String,
    pub color: String,
    /// Requested sizes; at least one.
    pub sizes: Vec<String>,
    pub quantity: u32,
    pub notes: String,
}

impl Default for CustomOrderForm {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            customer_phone: String::new(),
            product_type: "T-shirt".to_string(),
            color: "Black".to_string(),
            sizes: Vec::new(),
            quantity: 1,
            notes: String::new(),
        }
    }
}

impl CustomOrderForm {
    /// Check the form before uploading anything.
    ///
    /// # Errors
    ///
    /// Returns the first failed check: blank name/phone, empty size
    /// selection, or a zero quantity.
    pub fn validate(&self) -> Result<(), CustomOrderError> {
        if self.customer_name.trim().is_empty() {
            return Err(CustomOrderError::MissingField("customerName"));
        }
        if self.customer_phone.trim().is_empty() {
            return Err(CustomOrderError::MissingField("customerPhone"));
        }
        if self.sizes.is_empty() {
            return Err(CustomOrderError::NoSizes);
        }
        if self.quantity == 0 {
            return Err(CustomOrderError::InvalidQuantity);
        }
        Ok(())
    }

    /// Toggle a size in or out of the selection.
    pub fn toggle_size(&mut self, size: &str) {
        if let Some(pos) = self.sizes.iter().position(|s| s == size) {
            self.sizes.remove(pos);
        } else {
            self.sizes.push(size.to_string());
        }
    }
}

/// Custom-order submission over the upload and store clients.
pub struct CustomOrderService {
    store: Arc<dyn DocumentStore>,
    uploader: Arc<dyn Uploader>,
}

impl CustomOrderService {
    /// Create the service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, uploader: Arc<dyn Uploader>) -> Self {
        Self { store, uploader }
    }

    /// Validate, upload the design, and create the custom-order record.
    ///
    /// On failure the caller keeps the form state and retries explicitly;
    /// nothing retries automatically.
    ///
    /// # Errors
    ///
    /// Validation errors block before any remote call; `Upload` and
    /// `Store` are retryable remote failures.
    #[instrument(skip(self, form, design), fields(design = %design.file_name))]
    pub async fn submit(
        &self,
        form: &CustomOrderForm,
        design: UploadFile,
    ) -> Result<CustomOrderId, CustomOrderError> {
        form.validate()?;

        let design_file_name = design.file_name.clone();
        let design_url = self.uploader.upload(design).await?;

        let record = CustomOrder {
            customer_name: form.customer_name.clone(),
            customer_phone: form.customer_phone.clone(),
            product_type: form.product_type.clone(),
            color: form.color.clone(),
            sizes: form.sizes.clone(),
            quantity: form.quantity,
            notes: form.notes.clone(),
            design_file_name,
            design_url,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let Value::Object(fields) = serde_json::to_value(&record)? else {
            return Err(CustomOrderError::Serialize(serde::ser::Error::custom(
                "custom order did not serialize to an object",
            )));
        };

        let id = self.store.create(CUSTOM_ORDERS, fields).await?;
        info!(custom_order_id = %id, "Custom order submitted");
        Ok(CustomOrderId::new(id))
    }
}

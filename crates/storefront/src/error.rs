//! Unified error handling.
//!
//! Provides a unified `AppError` type covering every seam of the core.
//! Remote failures are caught at the point of the call and converted into
//! observable state; nothing here is allowed to terminate the process.
//! [`AppError::is_retryable`] is the single classification a UI shell needs
//! to decide between "try again" affordances and plain validation messages.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::custom::CustomOrderError;
use crate::docstore::DocStoreError;
use crate::kv::KvError;
use crate::uploads::UploadError;

/// Application-level error type for the storefront core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Document store operation failed.
    #[error("Document store error: {0}")]
    DocStore(#[from] DocStoreError),

    /// Persisted client state could not be opened or written.
    #[error("State persistence error: {0}")]
    Kv(#[from] KvError),

    /// Image upload failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Checkout submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Custom-order submission failed.
    #[error("Custom order error: {0}")]
    CustomOrder(#[from] CustomOrderError),
}

impl AppError {
    /// Whether a manual retry of the same action can succeed.
    ///
    /// Remote read/write failures are retryable; validation failures and
    /// configuration problems need a different input, not a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Kv(_) => false,
            Self::DocStore(_) => true,
            Self::Upload(e) => matches!(
                e,
                UploadError::Http(_)
                    | UploadError::Status { .. }
                    | UploadError::Parse(_)
                    | UploadError::MissingUrl
            ),
            Self::Checkout(e) => matches!(
                e,
                CheckoutError::Store(_) | CheckoutError::Serialize(_)
            ),
            Self::CustomOrder(e) => match e {
                CustomOrderError::Store(_) | CustomOrderError::Serialize(_) => true,
                CustomOrderError::Upload(upload) => matches!(
                    upload,
                    UploadError::Http(_)
                        | UploadError::Status { .. }
                        | UploadError::Parse(_)
                        | UploadError::MissingUrl
                ),
                _ => false,
            },
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

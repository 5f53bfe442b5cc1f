//! Image upload client.
//!
//! Uploads a customer-supplied image to the hosted file service and
//! returns its public URL. Size and MIME type are validated client-side
//! before any bytes go over the wire.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::UploadConfig;

/// Maximum accepted upload size in bytes (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types the upload service accepts.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Errors from image upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file exceeds [`MAX_UPLOAD_BYTES`].
    #[error("File size must be less than 10MB")]
    TooLarge {
        /// Actual size in bytes.
        size: usize,
    },

    /// The MIME type is not in the allowlist.
    #[error("Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed")]
    UnsupportedType {
        /// The rejected MIME type.
        content_type: String,
    },

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upload service answered with a non-success status.
    #[error("Upload failed with status {status}: {snippet}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading bytes of the response body.
        snippet: String,
    },

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service answered success without a public URL.
    #[error("No secure URL returned from upload service")]
    MissingUrl,
}

/// A file handed to the uploader.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name.
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Validate size and MIME type before any network call.
///
/// # Errors
///
/// Returns `TooLarge` or `UnsupportedType`.
pub fn validate(file: &UploadFile) -> Result<(), UploadError> {
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size: file.bytes.len(),
        });
    }
    if !ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
        return Err(UploadError::UnsupportedType {
            content_type: file.content_type.clone(),
        });
    }
    Ok(())
}

/// Something that can turn a file into a public URL.
///
/// Object-safe so the custom-order flow can be tested without a network.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload a file, returning its publicly resolvable URL.
    async fn upload(&self, file: UploadFile) -> Result<String, UploadError>;
}

// =============================================================================
// CloudUploader
// =============================================================================

/// Wire shape of a successful upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Production [`Uploader`] against the hosted file service.
#[derive(Clone)]
pub struct CloudUploader {
    inner: Arc<CloudUploaderInner>,
}

struct CloudUploaderInner {
    client: reqwest::Client,
    url: String,
    preset: String,
}

impl CloudUploader {
    /// Create a new upload client.
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            inner: Arc::new(CloudUploaderInner {
                client: reqwest::Client::new(),
                url: config.url.clone(),
                preset: config.preset.clone(),
            }),
        }
    }
}

#[async_trait]
impl Uploader for CloudUploader {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    async fn upload(&self, file: UploadFile) -> Result<String, UploadError> {
        validate(&file)?;

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.inner.preset.clone())
            .part("file", part);

        let response = self
            .inner
            .client
            .post(&self.inner.url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Upload service returned non-success status"
            );
            return Err(UploadError::Status {
                status: status.as_u16(),
                snippet: body.chars().take(200).collect(),
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)?;
        parsed.secure_url.ok_or(UploadError::MissingUrl)
    }
}

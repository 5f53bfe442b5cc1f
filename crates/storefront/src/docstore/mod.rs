//! Hosted document store client.
//!
//! All persistence and querying is delegated to a hosted document service.
//! The storefront consumes four operations - list a collection, list with
//! an equality predicate, fetch one record, create one record - and treats
//! records as opaque JSON maps (see [`Document`]). Typed projection happens
//! at the call sites (`catalog::conversions`, order submission).
//!
//! [`RestDocumentStore`] is the production implementation; [`memory`]
//! provides an in-memory store for tests. No request timeout is set - a
//! hung read leaves the dependent view loading, which callers may wrap
//! themselves.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

use crate::config::DocStoreConfig;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Document store returned status {status}: {snippet}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading bytes of the response body.
        snippet: String,
    },

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An opaque record in a collection: generated id plus field map.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct Document {
    /// Store-generated identifier, unique within the collection.
    pub id: String,
    /// The record's fields.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Project the record into a typed entity, spreading the document id
    /// into the field map as `id` first (entities carry their own id).
    ///
    /// # Errors
    ///
    /// Returns the serde error when the fields do not fit the target type.
    pub fn project<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(map))
    }
}

/// Read/write access to the hosted document store.
///
/// Object-safe so consumers can hold `Arc<dyn DocumentStore>` and tests can
/// substitute [`memory::MemoryDocumentStore`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every record of a collection.
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocStoreError>;

    /// Fetch the records of a collection whose `field` equals `value`.
    ///
    /// Equality is the only predicate the store offers; everything richer
    /// happens client-side over the cached catalog.
    async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, DocStoreError>;

    /// Fetch a single record by id, `None` when absent.
    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocStoreError>;

    /// Create a record, returning the generated id.
    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, DocStoreError>;
}

// =============================================================================
// RestDocumentStore
// =============================================================================

/// Wire envelope for collection listings.
#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<Document>,
}

/// Wire envelope for record creation.
#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

/// REST client for the hosted document store.
#[derive(Clone)]
pub struct RestDocumentStore {
    inner: Arc<RestDocumentStoreInner>,
}

struct RestDocumentStoreInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestDocumentStore {
    /// Create a new document store client.
    #[must_use]
    pub fn new(config: &DocStoreConfig) -> Self {
        Self {
            inner: Arc::new(RestDocumentStoreInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.expose_secret().to_string(),
            }),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}/documents", self.inner.base_url)
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DocStoreError> {
        let response = self
            .inner
            .client
            .get(url)
            .header("X-Api-Key", &self.inner.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Document store returned non-success status"
            );
            return Err(DocStoreError::Status {
                status: status.as_u16(),
                snippet: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse document store response"
                );
                Err(DocStoreError::Parse(e))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    #[instrument(skip(self), fields(collection = %collection))]
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocStoreError> {
        let url = self.collection_url(collection);
        let response: ListResponse = self.get_json(&url).await?;
        Ok(response.documents)
    }

    #[instrument(skip(self), fields(collection = %collection, field = %field))]
    async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, DocStoreError> {
        let url = format!(
            "{}?field={}&equals={}",
            self.collection_url(collection),
            urlencoding::encode(field),
            urlencoding::encode(value)
        );
        let response: ListResponse = self.get_json(&url).await?;
        Ok(response.documents)
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocStoreError> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let response = self
            .inner
            .client
            .get(&url)
            .header("X-Api-Key", &self.inner.api_key)
            .send()
            .await?;

        // An absent record is an absence, not a failure
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Document store returned non-success status"
            );
            return Err(DocStoreError::Status {
                status: status.as_u16(),
                snippet: body.chars().take(200).collect(),
            });
        }

        Ok(Some(serde_json::from_str(&body)?))
    }

    #[instrument(skip(self, fields), fields(collection = %collection))]
    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, DocStoreError> {
        let url = self.collection_url(collection);
        let response = self
            .inner
            .client
            .post(&url)
            .header("X-Api-Key", &self.inner.api_key)
            .json(&Value::Object(fields))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Document store rejected record creation"
            );
            return Err(DocStoreError::Status {
                status: status.as_u16(),
                snippet: body.chars().take(200).collect(),
            });
        }

        let created: CreateResponse = serde_json::from_str(&body)?;
        Ok(created.id)
    }
}

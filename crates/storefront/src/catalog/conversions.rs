//! Projection of opaque store records into typed catalog entities.
//!
//! A record that does not fit its entity shape is skipped with a warning
//! rather than failing the whole snapshot - one bad admin edit must not
//! take the storefront down.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::docstore::Document;

/// Project a fetched collection, dropping records that fail to project.
pub(crate) fn project_collection<T: DeserializeOwned>(
    documents: Vec<Document>,
    collection: &str,
) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| match doc.project::<T>() {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(
                    collection = %collection,
                    id = %doc.id,
                    error = %e,
                    "Skipping record that failed projection"
                );
                None
            }
        })
        .collect()
}

//! Error types for schema inference

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while analyzing a collection
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The document store failed while counting, sampling or listing indexes
    #[error("Failed to analyze collection {collection}: {source}")]
    Store {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// Configuration values are out of range
    #[error("Invalid inference configuration: {0}")]
    InvalidConfig(String),
}

impl InferenceError {
    pub(crate) fn store(collection: &str, source: StoreError) -> Self {
        InferenceError::Store {
            collection: collection.to_string(),
            source,
        }
    }

    /// Short hint suitable for command-line output
    pub fn user_message(&self) -> String {
        match self {
            InferenceError::Store {
                collection,
                source: StoreError::CollectionNotFound(_),
            } => format!(
                "Collection '{}' does not exist. Run `docschema collections` to list available collections.",
                collection
            ),
            InferenceError::Store { collection, .. } => format!(
                "Could not read collection '{}'. Check the database connection.",
                collection
            ),
            InferenceError::InvalidConfig(msg) => format!("Fix the configuration: {}", msg),
        }
    }
}

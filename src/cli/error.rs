//! CLI error type

use std::path::PathBuf;

use thiserror::Error;

use crate::generator::GenerationError;
use crate::storage::StorageError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Failed to load config {0}: {1}")]
    ConfigError(PathBuf, String),

    #[error("Collections not found: {}", .missing.join(", "))]
    CollectionsNotFound {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to format output: {0}")]
    Output(String),
}

impl CliError {
    /// Hint printed below the error
    pub fn user_message(&self) -> Option<String> {
        match self {
            CliError::MissingConfig(var) => Some(format!(
                "Set {} in the environment or pass it as a flag.",
                var
            )),
            CliError::ConfigError(_, _) => {
                Some("Config keys use camelCase, e.g. sampleSize = 200".to_string())
            }
            CliError::CollectionsNotFound { available, .. } => Some(format!(
                "Available collections: {}",
                available.join(", ")
            )),
            CliError::Store(StoreError::Connection(_)) => {
                Some("Check MONGO_URI and that the server is reachable.".to_string())
            }
            CliError::Storage(e) => Some(e.user_message()),
            CliError::Generation(e) => Some(e.user_message()),
            _ => None,
        }
    }
}

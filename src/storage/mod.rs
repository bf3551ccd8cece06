//! Schema artifact persistence
//!
//! Defines the SchemaStore trait and implementations:
//! - FileSchemaStore: JSON file on the native file system
//! - MemorySchemaStore: In-memory slot (embedding, tests)
//!
//! Every store serializes `update` calls, so concurrent generation runs in one
//! process never interleave their read-modify-write cycles.

use tracing::warn;

use crate::artifact::SchemaArtifact;

pub mod filesystem;
pub mod memory;

pub use filesystem::{DEFAULT_SCHEMA_FILE, FileSchemaStore};
pub use memory::MemorySchemaStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    /// Short hint suitable for command-line output
    pub fn user_message(&self) -> String {
        match self {
            StorageError::FileNotFound(path) => format!(
                "No schema file at {}. Run `docschema generate` first.",
                path
            ),
            StorageError::SerializationError(_) => {
                "The schema file is not valid JSON. Fix or delete it and regenerate.".to_string()
            }
            StorageError::PermissionDenied(msg) => format!("Access denied: {}", msg),
            other => other.to_string(),
        }
    }
}

/// Trait for schema artifact stores
pub trait SchemaStore {
    /// Read the persisted artifact, `None` if nothing has been written yet
    fn read(&self) -> Result<Option<SchemaArtifact>, StorageError>;

    /// Replace the persisted artifact
    fn write(&self, artifact: &SchemaArtifact) -> Result<(), StorageError>;

    /// Read, transform and write back the artifact under the store's lock
    ///
    /// The transform receives the degraded read (see [`SchemaStore::load`]).
    fn update<F>(&self, apply: F) -> Result<SchemaArtifact, StorageError>
    where
        F: FnOnce(Option<SchemaArtifact>) -> SchemaArtifact;

    /// Read the artifact, treating a missing, unreadable or malformed one as absent
    fn load(&self) -> Option<SchemaArtifact> {
        match self.read() {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Ignoring existing schema artifact: {}", e);
                None
            }
        }
    }
}

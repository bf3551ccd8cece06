//! In-memory schema store

use std::sync::Mutex;

use super::{SchemaStore, StorageError};
use crate::artifact::SchemaArtifact;

/// Holds the artifact in memory
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    slot: Mutex<Option<SchemaArtifact>>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with an artifact
    pub fn with_artifact(artifact: SchemaArtifact) -> Self {
        Self {
            slot: Mutex::new(Some(artifact)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SchemaArtifact>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SchemaStore for MemorySchemaStore {
    fn read(&self) -> Result<Option<SchemaArtifact>, StorageError> {
        Ok(self.slot().clone())
    }

    fn write(&self, artifact: &SchemaArtifact) -> Result<(), StorageError> {
        *self.slot() = Some(artifact.clone());
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<SchemaArtifact, StorageError>
    where
        F: FnOnce(Option<SchemaArtifact>) -> SchemaArtifact,
    {
        let mut slot = self.slot();
        let artifact = apply(slot.take());
        *slot = Some(artifact.clone());
        Ok(artifact)
    }
}

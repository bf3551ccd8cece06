//! File system schema store
//!
//! Keeps the artifact as a JSON file below a base directory.
//!
//! ## Security
//!
//! The artifact path is validated to prevent path traversal. Paths containing
//! ".." are rejected, and resolved paths are verified to remain within the
//! base directory.
//!
//! ## Atomicity
//!
//! Writes go to a temporary file in the target directory which is then renamed
//! over the artifact, so readers never observe a partially written file.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{SchemaStore, StorageError};
use crate::artifact::SchemaArtifact;

/// File name used when none is given
pub const DEFAULT_SCHEMA_FILE: &str = "schemas.json";

/// File system schema store
pub struct FileSchemaStore {
    base_path: PathBuf,
    file: String,
    lock: Mutex<()>,
}

impl FileSchemaStore {
    /// Create a store for `file`, relative to `base_path`
    ///
    /// # Example
    ///
    /// ```rust
    /// use docschema::storage::FileSchemaStore;
    ///
    /// let store = FileSchemaStore::new("./data", "schemas/schemas.json");
    /// ```
    pub fn new(base_path: impl AsRef<Path>, file: impl Into<String>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            file: file.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store for an artifact path, using its directory as the base
    pub fn at(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_SCHEMA_FILE.to_string());
        Self::new(base, file)
    }

    /// Resolved location of the artifact
    pub fn path(&self) -> Result<PathBuf, StorageError> {
        self.resolve_path(&self.file)
    }

    /// Resolve a path relative to the base path with security checks.
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let normalized = path.trim_start_matches('/');

        if normalized.contains("..") {
            return Err(StorageError::PermissionDenied(
                "Path traversal (..) not allowed".to_string(),
            ));
        }

        let full = self.base_path.join(normalized);

        for component in full.components() {
            if matches!(component, Component::ParentDir) {
                return Err(StorageError::PermissionDenied(
                    "Path traversal not allowed".to_string(),
                ));
            }
        }

        let base_canonical = self
            .base_path
            .canonicalize()
            .unwrap_or_else(|_| self.base_path.clone());

        if full.exists() {
            let canonical = full
                .canonicalize()
                .map_err(|e| StorageError::IoError(format!("Failed to resolve path: {}", e)))?;

            if !canonical.starts_with(&base_canonical) {
                return Err(StorageError::PermissionDenied(
                    "Path escapes base directory".to_string(),
                ));
            }

            return Ok(canonical);
        }

        if let Some(parent) = full.parent()
            && parent.exists()
        {
            let parent_canonical = parent.canonicalize().map_err(|e| {
                StorageError::IoError(format!("Failed to resolve parent path: {}", e))
            })?;

            if !parent_canonical.starts_with(&base_canonical) {
                return Err(StorageError::PermissionDenied(
                    "Path escapes base directory".to_string(),
                ));
            }
        }

        Ok(full)
    }
}

impl SchemaStore for FileSchemaStore {
    fn read(&self) -> Result<Option<SchemaArtifact>, StorageError> {
        let full_path = self.resolve_path(&self.file)?;

        let content = match std::fs::read_to_string(&full_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::IoError(format!(
                    "Failed to read {}: {}",
                    self.file, e
                )));
            }
        };

        SchemaArtifact::from_json(&content)
            .map(Some)
            .map_err(|e| StorageError::SerializationError(format!("{}: {}", self.file, e)))
    }

    fn write(&self, artifact: &SchemaArtifact) -> Result<(), StorageError> {
        let full_path = self.resolve_path(&self.file)?;
        let parent = full_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_path.clone());

        std::fs::create_dir_all(&parent).map_err(|e| {
            StorageError::IoError(format!("Failed to create directory for {}: {}", self.file, e))
        })?;

        let json = artifact
            .to_json()
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| {
            StorageError::IoError(format!("Failed to create temporary file: {}", e))
        })?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StorageError::IoError(format!("Failed to write {}: {}", self.file, e)))?;
        tmp.persist(&full_path).map_err(|e| {
            StorageError::IoError(format!("Failed to replace {}: {}", self.file, e.error))
        })?;

        info!("Schemas saved to {}", full_path.display());
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<SchemaArtifact, StorageError>
    where
        F: FnOnce(Option<SchemaArtifact>) -> SchemaArtifact,
    {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let existing = self.load();
        debug!(
            "Updating {} (existing artifact: {})",
            self.file,
            existing.is_some()
        );
        let artifact = apply(existing);
        self.write(&artifact)?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_traversal_blocked() {
        let temp = TempDir::new().unwrap();

        let store = FileSchemaStore::new(temp.path(), "../etc/passwd");
        assert!(matches!(store.path(), Err(StorageError::PermissionDenied(_))));

        let store = FileSchemaStore::new(temp.path(), "/foo/../../../etc/passwd");
        assert!(matches!(store.path(), Err(StorageError::PermissionDenied(_))));

        let store = FileSchemaStore::new(temp.path(), "valid/path/schemas.json");
        assert!(store.path().is_ok());
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let store = FileSchemaStore::new(temp.path(), DEFAULT_SCHEMA_FILE);
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn test_write_creates_directories() {
        let temp = TempDir::new().unwrap();
        let store = FileSchemaStore::new(temp.path(), "data/schemas/schemas.json");

        store.write(&SchemaArtifact::new(0)).unwrap();

        let written = temp.path().join("data/schemas/schemas.json");
        assert!(written.exists());
        let read = store.read().unwrap().unwrap();
        assert_eq!(read.description, "Auto-generated schemas for 0 collection(s)");
    }

    #[test]
    fn test_malformed_file_degrades_on_load() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(DEFAULT_SCHEMA_FILE), "{ not json").unwrap();
        let store = FileSchemaStore::new(temp.path(), DEFAULT_SCHEMA_FILE);

        assert!(matches!(
            store.read(),
            Err(StorageError::SerializationError(_))
        ));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_update_replaces_malformed_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(DEFAULT_SCHEMA_FILE), r#"{"collections": 42}"#).unwrap();
        let store = FileSchemaStore::new(temp.path(), DEFAULT_SCHEMA_FILE);

        let written = store
            .update(|existing| {
                assert!(existing.is_none());
                SchemaArtifact::new(2)
            })
            .unwrap();

        assert_eq!(store.read().unwrap(), Some(written));
    }

    #[test]
    fn test_at_splits_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schemas.json");
        let store = FileSchemaStore::at(&path);
        store.write(&SchemaArtifact::new(1)).unwrap();
        assert!(path.exists());
    }
}

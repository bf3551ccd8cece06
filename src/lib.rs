//! docschema - Schema inference and relationship detection for document stores
//!
//! Provides:
//! - Document store access (in-memory, MongoDB)
//! - Field type, enumeration and index inference per collection
//! - Foreign-key and correlation detection across collections
//! - Merging and persisting the schema artifact
//!
//! ## Example
//!
//! ```rust
//! use bson::doc;
//! use docschema::{GenerateRequest, MemorySchemaStore, MemoryStore, SchemaGenerator};
//!
//! let mut store = MemoryStore::new();
//! store.insert_many("customers", (1..=3).map(|i| doc! { "_id": i, "name": "c" }));
//! store.insert_many("orders", (1..=6).map(|i| doc! { "_id": i, "customer_id": (i % 3) + 1 }));
//!
//! let generator = SchemaGenerator::new(store, MemorySchemaStore::new());
//! let report = generator
//!     .generate(&GenerateRequest::new(["orders", "customers"]))
//!     .unwrap();
//! assert_eq!(report.stats.relationships_found, 1);
//! ```

pub mod artifact;
pub mod cli;
pub mod generator;
pub mod inference;
pub mod relationships;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use artifact::{CollectionEntry, MergeStrategy, SchemaArtifact};
pub use generator::{
    GenerateRequest, GenerationError, GenerationReport, GenerationStats, SchemaGenerator,
};
pub use inference::{
    CollectionSchema, FieldSchema, FieldType, InferenceConfig, InferenceConfigBuilder,
    InferenceError,
};
pub use relationships::{Correlation, Link, Relationship, RelationshipType, RelationshipsSection};
pub use storage::{FileSchemaStore, MemorySchemaStore, SchemaStore, StorageError};
pub use store::{DocumentStore, Filter, IndexSpec, MemoryStore, Stage, StoreError};
#[cfg(feature = "mongodb-backend")]
pub use store::MongoStore;

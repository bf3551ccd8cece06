//! Schema inference for document-store collections
//!
//! Samples a collection's documents and infers, per field, a dominant type,
//! presence rate, optional enumeration and an example value. Index flags come
//! from the store's index catalog.
//!
//! ## Example
//!
//! ```rust
//! use bson::doc;
//! use docschema::inference::{CollectionAnalyzer, FieldType, InferenceConfig};
//! use docschema::store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! store.insert_many("users", vec![doc! { "name": "Alice", "age": 30 }]);
//!
//! let config = InferenceConfig::default();
//! let schema = CollectionAnalyzer::new(&store, &config).analyze("users", 100).unwrap();
//! assert_eq!(schema.fields["age"].field_type, FieldType::Integer);
//! ```

mod analyzer;
mod config;
mod error;
mod formats;
mod indexes;
mod types;

pub use analyzer::{CollectionAnalyzer, FieldAnalyzer, classify, example_value};
pub use config::{
    CORRELATION_CONFIDENCE_THRESHOLD, InferenceConfig, InferenceConfigBuilder,
    RELATIONSHIP_CONFIDENCE_THRESHOLD,
};
pub use error::InferenceError;
pub use formats::{describe_field, is_iso_datetime, is_object_id_hex};
pub use indexes::{IndexedField, detect_indexes};
pub use types::{CollectionSchema, FieldAnalysis, FieldSchema, FieldType, ItemsSchema};

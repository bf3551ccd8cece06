//! Document store abstraction
//!
//! Defines the DocumentStore trait consumed by the schema engine and its implementations:
//! - MemoryStore: In-memory collections (fixtures, tests, embedding)
//! - MongoStore: MongoDB driver (feature `mongodb-backend`)
//!
//! The engine only ever reads. Documents and values use the BSON model so that
//! primary-key identifiers and date values keep their native types.

use bson::{Bson, Document};

pub mod memory;
#[cfg(feature = "mongodb-backend")]
pub mod mongo;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb-backend")]
pub use mongo::MongoStore;

/// Name of the default primary-key index
pub const PRIMARY_INDEX_NAME: &str = "_id_";

/// Error type for document store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Document filter understood by every store
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Field exists and is not null
    Present(String),
    /// Field value is one of `values` (for arrays: any element is)
    In { field: String, values: Vec<Bson> },
}

impl Filter {
    pub fn present(field: impl Into<String>) -> Self {
        Filter::Present(field.into())
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Bson>) -> Self {
        Filter::In {
            field: field.into(),
            values,
        }
    }
}

/// A single aggregation pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Limit(usize),
    /// Keep only the listed fields (plus `_id`)
    Project(Vec<String>),
    /// Random sample of the given size
    Sample(usize),
}

/// A secondary index as reported by the store's index catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Index name (`_id_` for the default primary-key index)
    pub name: String,
    /// Indexed field names, in key order
    pub keys: Vec<String>,
    /// Whether the index enforces uniqueness
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, keys: &[&str], unique: bool) -> Self {
        Self {
            name: name.into(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            unique,
        }
    }

    /// Single-field index named the way the store names it by default (`field_1`)
    pub fn single(field: &str, unique: bool) -> Self {
        Self::new(format!("{}_1", field), &[field], unique)
    }
}

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Value equality as the store's query engine applies it: numbers compare by
/// value across integer and double types
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Read-only access to a document store
///
/// Implementations must be usable from a single thread; the engine never issues
/// concurrent calls.
pub trait DocumentStore {
    /// Count documents in `collection` matching `filter`
    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Draw a random sample of at most `size` documents
    fn sample(&self, collection: &str, size: usize) -> Result<Vec<Document>, StoreError>;

    /// Run an aggregation pipeline
    fn aggregate(&self, collection: &str, pipeline: &[Stage])
    -> Result<Vec<Document>, StoreError>;

    /// List the collection's indexes, including the default primary-key index
    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexSpec>, StoreError>;

    /// Count documents whose `field` matches any of `values`
    fn count_matching_in(
        &self,
        collection: &str,
        field: &str,
        values: &[Bson],
    ) -> Result<u64, StoreError> {
        self.count(collection, &Filter::is_in(field, values.to_vec()))
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(collection, filter)
    }

    fn sample(&self, collection: &str, size: usize) -> Result<Vec<Document>, StoreError> {
        (**self).sample(collection, size)
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Document>, StoreError> {
        (**self).aggregate(collection, pipeline)
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexSpec>, StoreError> {
        (**self).list_indexes(collection)
    }

    fn count_matching_in(
        &self,
        collection: &str,
        field: &str,
        values: &[Bson],
    ) -> Result<u64, StoreError> {
        (**self).count_matching_in(collection, field, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_lookup_dotted_path() {
        let d = doc! { "a": { "b": { "c": 3 } }, "top": "x" };
        assert_eq!(lookup(&d, "a.b.c"), Some(&Bson::Int32(3)));
        assert_eq!(lookup(&d, "top"), Some(&Bson::String("x".to_string())));
        assert_eq!(lookup(&d, "a.x"), None);
        assert_eq!(lookup(&d, "top.x"), None);
    }

    #[test]
    fn test_single_index_naming() {
        let index = IndexSpec::single("email", true);
        assert_eq!(index.name, "email_1");
        assert_eq!(index.keys, vec!["email".to_string()]);
    }

    #[test]
    fn test_values_equal_across_numeric_types() {
        assert!(values_equal(&Bson::Int32(7), &Bson::Int64(7)));
        assert!(values_equal(&Bson::Int64(7), &Bson::Double(7.0)));
        assert!(!values_equal(&Bson::Int32(7), &Bson::String("7".to_string())));
        assert!(values_equal(
            &Bson::String("a".to_string()),
            &Bson::String("a".to_string())
        ));
    }
}

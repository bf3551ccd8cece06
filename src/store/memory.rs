//! In-memory document store
//!
//! Implements DocumentStore over collections held in memory. Used for fixtures,
//! tests and embedding the engine without a database. Query semantics follow the
//! document database closely enough for schema inference: dotted paths, `$in`
//! matching array elements, and numeric equality across integer/double types.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bson::oid::ObjectId;
use bson::{Bson, Document};

use super::{
    DocumentStore, Filter, IndexSpec, PRIMARY_INDEX_NAME, Stage, StoreError, lookup, values_equal,
};

#[derive(Debug, Default)]
struct MemoryCollection {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

impl MemoryCollection {
    fn new() -> Self {
        Self {
            documents: Vec::new(),
            indexes: vec![IndexSpec::new(PRIMARY_INDEX_NAME, &["_id"], true)],
        }
    }
}

/// In-memory document store
pub struct MemoryStore {
    collections: BTreeMap<String, MemoryCollection>,
    rng: Mutex<fastrand::Rng>,
}

impl MemoryStore {
    /// Create an empty store with a randomly seeded sampler
    pub fn new() -> Self {
        Self {
            collections: BTreeMap::new(),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Create an empty store whose sampling is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self {
            collections: BTreeMap::new(),
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// Create a collection if it does not exist yet
    pub fn create_collection(&mut self, name: &str) {
        self.collections
            .entry(name.to_string())
            .or_insert_with(MemoryCollection::new);
    }

    /// Insert documents, creating the collection on first use
    ///
    /// Documents without an `_id` get a fresh ObjectId, as the database would assign.
    pub fn insert_many(&mut self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let coll = self
            .collections
            .entry(collection.to_string())
            .or_insert_with(MemoryCollection::new);

        for mut doc in documents {
            if !doc.contains_key("_id") {
                doc.insert("_id", ObjectId::new());
            }
            coll.documents.push(doc);
        }
    }

    /// Declare a secondary index
    pub fn create_index(&mut self, collection: &str, index: IndexSpec) {
        let coll = self
            .collections
            .entry(collection.to_string())
            .or_insert_with(MemoryCollection::new);
        coll.indexes.retain(|existing| existing.name != index.name);
        coll.indexes.push(index);
    }

    /// Remove a collection and its indexes
    pub fn drop_collection(&mut self, collection: &str) -> bool {
        self.collections.remove(collection).is_some()
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    fn collection(&self, name: &str) -> Result<&MemoryCollection, StoreError> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn random_subset(&self, mut documents: Vec<Document>, size: usize) -> Vec<Document> {
        if documents.len() > size {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.shuffle(&mut documents);
            documents.truncate(size);
        }
        documents
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let coll = self.collection(collection)?;
        let count = coll
            .documents
            .iter()
            .filter(|doc| matches_filter(doc, filter))
            .count();
        Ok(count as u64)
    }

    fn sample(&self, collection: &str, size: usize) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection)?;
        Ok(self.random_subset(coll.documents.clone(), size))
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection)?;
        let mut documents = coll.documents.clone();

        for stage in pipeline {
            documents = match stage {
                Stage::Match(filter) => documents
                    .into_iter()
                    .filter(|doc| matches_filter(doc, filter))
                    .collect(),
                Stage::Limit(limit) => {
                    documents.truncate(*limit);
                    documents
                }
                Stage::Project(fields) => documents
                    .iter()
                    .map(|doc| project(doc, fields))
                    .collect(),
                Stage::Sample(size) => self.random_subset(documents, *size),
            };
        }

        Ok(documents)
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexSpec>, StoreError> {
        Ok(self.collection(collection)?.indexes.clone())
    }
}

fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Present(field) => matches!(lookup(doc, field), Some(v) if *v != Bson::Null),
        Filter::In { field, values } => match lookup(doc, field) {
            Some(Bson::Array(items)) => items
                .iter()
                .any(|item| values.iter().any(|v| values_equal(item, v))),
            Some(value) => values.iter().any(|v| values_equal(value, v)),
            None => false,
        },
    }
}

fn project(doc: &Document, fields: &[String]) -> Document {
    let mut projected = Document::new();
    if let Some(id) = doc.get("_id") {
        projected.insert("_id", id.clone());
    }
    for field in fields {
        let top = field.split('.').next().unwrap_or(field);
        if let Some(value) = doc.get(top) {
            projected.insert(top, value.clone());
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::with_seed(7);
        store.insert_many(
            "orders",
            (1..=10).map(|i| {
                let status = if i % 2 == 0 { "paid" } else { "open" };
                doc! { "_id": i, "status": status, "tags": ["a", "b"] }
            }),
        );
        store
    }

    #[test]
    fn test_count_with_filters() {
        let store = store();
        assert_eq!(store.count("orders", &Filter::All).unwrap(), 10);
        assert_eq!(store.count("orders", &Filter::present("status")).unwrap(), 10);
        assert_eq!(store.count("orders", &Filter::present("missing")).unwrap(), 0);
        assert_eq!(
            store
                .count_matching_in("orders", "_id", &[Bson::Int64(1), Bson::Double(2.0), Bson::Int32(99)])
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_in_matches_array_elements() {
        let store = store();
        let count = store
            .count_matching_in("orders", "tags", &[Bson::String("b".to_string())])
            .unwrap();
        assert_eq!(count, 10);
    }

    #[test]
    fn test_sample_is_bounded() {
        let store = store();
        assert_eq!(store.sample("orders", 3).unwrap().len(), 3);
        assert_eq!(store.sample("orders", 50).unwrap().len(), 10);
    }

    #[test]
    fn test_aggregate_match_limit_project() {
        let store = store();
        let docs = store
            .aggregate(
                "orders",
                &[
                    Stage::Match(Filter::present("status")),
                    Stage::Limit(4),
                    Stage::Project(vec!["status".to_string()]),
                ],
            )
            .unwrap();
        assert_eq!(docs.len(), 4);
        assert!(docs.iter().all(|d| d.contains_key("_id") && d.contains_key("status")));
        assert!(docs.iter().all(|d| !d.contains_key("tags")));
    }

    #[test]
    fn test_unknown_collection_errors() {
        let store = store();
        assert!(matches!(
            store.count("nope", &Filter::All),
            Err(StoreError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn test_default_primary_index() {
        let mut store = store();
        store.create_index("orders", IndexSpec::single("status", false));
        let indexes = store.list_indexes("orders").unwrap();
        assert_eq!(indexes[0].name, PRIMARY_INDEX_NAME);
        assert_eq!(indexes[1].keys, vec!["status".to_string()]);
    }

    #[test]
    fn test_insert_assigns_object_id() {
        let mut store = MemoryStore::new();
        store.insert_many("events", vec![doc! { "name": "x" }]);
        let docs = store.sample("events", 1).unwrap();
        assert!(matches!(docs[0].get("_id"), Some(Bson::ObjectId(_))));
    }
}

//! Index detection from the store's index catalog

use crate::store::{DocumentStore, PRIMARY_INDEX_NAME, StoreError};

/// A field covered by at least one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedField {
    pub field: String,
    /// True if any index covering the field is unique
    pub unique: bool,
}

/// Read the indexed fields of `collection`
///
/// The default primary-key index is skipped; `_id` is always reported as
/// indexed and unique. Fields keep the order in which the catalog lists them.
pub fn detect_indexes<S: DocumentStore + ?Sized>(
    store: &S,
    collection: &str,
) -> Result<Vec<IndexedField>, StoreError> {
    let mut fields: Vec<IndexedField> = Vec::new();

    for index in store.list_indexes(collection)? {
        if index.name == PRIMARY_INDEX_NAME {
            continue;
        }
        for key in index.keys {
            match fields.iter_mut().find(|f| f.field == key) {
                Some(existing) => existing.unique |= index.unique,
                None => fields.push(IndexedField {
                    field: key,
                    unique: index.unique,
                }),
            }
        }
    }

    match fields.iter_mut().find(|f| f.field == "_id") {
        Some(id) => id.unique = true,
        None => fields.push(IndexedField {
            field: "_id".to_string(),
            unique: true,
        }),
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IndexSpec, MemoryStore};
    use bson::doc;

    #[test]
    fn test_primary_index_only() {
        let mut store = MemoryStore::new();
        store.insert_many("users", vec![doc! { "name": "a" }]);

        let fields = detect_indexes(&store, "users").unwrap();
        assert_eq!(
            fields,
            vec![IndexedField {
                field: "_id".to_string(),
                unique: true
            }]
        );
    }

    #[test]
    fn test_secondary_indexes_in_catalog_order() {
        let mut store = MemoryStore::new();
        store.create_collection("users");
        store.create_index("users", IndexSpec::single("email", true));
        store.create_index("users", IndexSpec::new("name_city", &["name", "city"], false));
        store.create_index("users", IndexSpec::single("name", true));

        let fields = detect_indexes(&store, "users").unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["email", "name", "city", "_id"]);
        assert!(fields[0].unique);
        assert!(fields[1].unique);
        assert!(!fields[2].unique);
    }

    #[test]
    fn test_unknown_collection_propagates() {
        let store = MemoryStore::new();
        assert!(detect_indexes(&store, "missing").is_err());
    }
}

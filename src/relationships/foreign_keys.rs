//! Foreign-key detection
//!
//! Candidate fields are recognized by name suffix (`_id`, `_ids`, `_ref`, `_key`).
//! The stripped base name is resolved against the analyzed collections using
//! simple plural/singular variations, then the link is validated by checking
//! that sampled values exist as `_id` in the target collection.

use std::collections::BTreeSet;

use bson::Bson;
use bson::oid::ObjectId;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::types::{Relationship, RelationshipType};
use crate::inference::{CollectionSchema, FieldType, InferenceConfig, is_object_id_hex};
use crate::store::{DocumentStore, Filter, Stage, StoreError, lookup, values_equal};

static FOREIGN_KEY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)_(id|ids|ref|key)$").expect("valid regex"));

/// Whether a field name follows the foreign-key naming pattern
pub fn is_foreign_key_candidate(field_name: &str) -> bool {
    FOREIGN_KEY_SUFFIX.is_match(field_name)
}

/// Resolve the collection a foreign-key field points to
///
/// Tries the base name, base + `s`, base without trailing `s`, base + `es`,
/// base without trailing `es`; the first known collection wins.
pub fn find_target_collection(field_name: &str, known: &BTreeSet<&str>) -> Option<String> {
    let base = FOREIGN_KEY_SUFFIX.replace(field_name, "");
    if base.is_empty() {
        return None;
    }

    let candidates = [
        Some(base.to_string()),
        Some(format!("{}s", base)),
        base.strip_suffix('s').map(str::to_string),
        Some(format!("{}es", base)),
        base.strip_suffix("es").map(str::to_string),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty() && known.contains(candidate.as_str()))
}

/// Result of validating one candidate against real data
#[derive(Debug)]
enum Validation {
    /// No usable values in the source collection
    Absent,
    /// Values found but too few resolve in the target
    Rejected { confidence: f64 },
    Confirmed(Relationship),
}

/// Detects foreign-key relationships between analyzed collections
pub struct ForeignKeyDetector<'a, S: DocumentStore> {
    store: &'a S,
    config: &'a InferenceConfig,
}

impl<'a, S: DocumentStore> ForeignKeyDetector<'a, S> {
    pub fn new(store: &'a S, config: &'a InferenceConfig) -> Self {
        Self { store, config }
    }

    /// Detect relationships among `collections`
    ///
    /// Validation failures are logged and treated as no relationship.
    pub fn detect(&self, collections: &[CollectionSchema]) -> Vec<Relationship> {
        let known: BTreeSet<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        let mut relationships = Vec::new();

        for source in collections {
            for (field_name, field) in &source.fields {
                if !is_foreign_key_candidate(field_name) {
                    continue;
                }
                let Some(target) = find_target_collection(field_name, &known) else {
                    continue;
                };

                debug!(
                    "Validating candidate {}.{} -> {}",
                    source.name, field_name, target
                );

                let is_array = field.field_type == FieldType::Array;
                match self.validate(&source.name, field_name, &target, is_array) {
                    Ok(Validation::Confirmed(relationship)) => {
                        debug!(
                            "Confirmed {} -> {} via {} ({})",
                            relationship.from,
                            relationship.to,
                            relationship.field,
                            relationship.confidence
                        );
                        relationships.push(relationship);
                    }
                    Ok(Validation::Rejected { confidence }) => {
                        debug!(
                            "Rejected {}.{} -> {}: confidence {:.2}",
                            source.name, field_name, target, confidence
                        );
                    }
                    Ok(Validation::Absent) => {}
                    Err(e) => {
                        warn!(
                            "Failed to validate relationship {}.{} -> {}: {}",
                            source.name, field_name, target, e
                        );
                    }
                }
            }
        }

        relationships
    }

    fn validate(
        &self,
        source: &str,
        field: &str,
        target: &str,
        is_array: bool,
    ) -> Result<Validation, StoreError> {
        let documents = self.store.aggregate(
            source,
            &[
                Stage::Match(Filter::present(field)),
                Stage::Limit(self.config.fk_sample_documents),
                Stage::Project(vec![field.to_string()]),
            ],
        )?;

        let mut values: Vec<Bson> = Vec::new();
        for document in &documents {
            match lookup(document, field) {
                None | Some(Bson::Null) => {}
                Some(Bson::Array(items)) if is_array => values.extend(items.iter().cloned()),
                Some(value) => values.push(value.clone()),
            }
        }

        if values.is_empty() {
            return Ok(Validation::Absent);
        }

        values.truncate(self.config.fk_check_values);
        let checked = values.len();
        let values: Vec<Bson> = values.into_iter().map(coerce_identifier).collect();

        let existing: Vec<Bson> = self
            .store
            .aggregate(
                target,
                &[
                    Stage::Match(Filter::is_in("_id", values.clone())),
                    Stage::Project(vec!["_id".to_string()]),
                ],
            )?
            .into_iter()
            .filter_map(|mut document| document.remove("_id"))
            .collect();

        // Repeated values each count, as a many-to-one key normally repeats
        let matches = values
            .iter()
            .filter(|value| existing.iter().any(|id| values_equal(value, id)))
            .count();
        let confidence = matches as f64 / checked as f64;

        if confidence > self.config.relationship_threshold {
            let relationship_type = if is_array {
                RelationshipType::ManyToMany
            } else {
                RelationshipType::ManyToOne
            };
            Ok(Validation::Confirmed(Relationship::new(
                source,
                target,
                field,
                relationship_type,
                confidence,
            )))
        } else {
            Ok(Validation::Rejected { confidence })
        }
    }
}

/// 24-character hex strings become native identifiers
fn coerce_identifier(value: Bson) -> Bson {
    match value {
        Bson::String(s) if is_object_id_hex(&s) => match ObjectId::parse_str(&s) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(s),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known<'a>(names: &[&'a str]) -> BTreeSet<&'a str> {
        names.iter().copied().collect()
    }

    #[test]
    fn test_candidate_suffixes() {
        assert!(is_foreign_key_candidate("customer_id"));
        assert!(is_foreign_key_candidate("order_IDS"));
        assert!(is_foreign_key_candidate("parent_ref"));
        assert!(is_foreign_key_candidate("api_key"));
        assert!(!is_foreign_key_candidate("customerId"));
        assert!(!is_foreign_key_candidate("identity"));
    }

    #[test]
    fn test_target_resolution_variants() {
        let names = known(&["customers", "category", "boxes", "status"]);
        assert_eq!(
            find_target_collection("customer_id", &names).as_deref(),
            Some("customers")
        );
        assert_eq!(
            find_target_collection("categorys_ref", &names).as_deref(),
            Some("category")
        );
        assert_eq!(
            find_target_collection("box_ids", &names).as_deref(),
            Some("boxes")
        );
        assert_eq!(
            find_target_collection("statuses_key", &names).as_deref(),
            Some("status")
        );
        assert_eq!(find_target_collection("vendor_id", &names), None);
    }

    #[test]
    fn test_exact_base_wins() {
        let names = known(&["user", "users"]);
        assert_eq!(
            find_target_collection("user_id", &names).as_deref(),
            Some("user")
        );
    }

    #[test]
    fn test_empty_base_skipped() {
        let names = known(&["s", "es"]);
        assert_eq!(find_target_collection("_id", &names), None);
    }

    #[test]
    fn test_coerce_identifier() {
        let hex = "507f1f77bcf86cd799439011";
        assert!(matches!(
            coerce_identifier(Bson::String(hex.to_string())),
            Bson::ObjectId(_)
        ));
        assert_eq!(
            coerce_identifier(Bson::String("short".to_string())),
            Bson::String("short".to_string())
        );
        assert_eq!(coerce_identifier(Bson::Int32(4)), Bson::Int32(4));
    }
}

//! Correlation detection
//!
//! A correlation field is an indexed string field shared by several collections
//! that links records without following the foreign-key naming convention, such
//! as `event_tracking_id`. Overlap is validated by sampling values from the first
//! collection and counting documents in the others that carry one of them.

use std::collections::BTreeMap;

use bson::Bson;
use tracing::{debug, warn};

use super::types::{Correlation, round_confidence};
use crate::inference::{CollectionSchema, FieldSchema, FieldType, InferenceConfig};
use crate::store::{DocumentStore, Filter, Stage, StoreError, lookup};

/// Whether a field qualifies as a correlation field
pub fn is_correlation_candidate(field_name: &str, field: &FieldSchema) -> bool {
    if field_name == "_id" || field.field_type != FieldType::String || !field.indexed {
        return false;
    }
    let lower = field_name.to_lowercase();
    lower.contains("tracking") || lower.contains("correlation") || field_name.ends_with("_id")
}

#[derive(Debug)]
struct Overlap {
    confidence: f64,
    matches: u64,
}

/// Detects fields that correlate records across collections
pub struct CorrelationDetector<'a, S: DocumentStore> {
    store: &'a S,
    config: &'a InferenceConfig,
}

impl<'a, S: DocumentStore> CorrelationDetector<'a, S> {
    pub fn new(store: &'a S, config: &'a InferenceConfig) -> Self {
        Self { store, config }
    }

    /// Detect correlations among `collections`
    ///
    /// Validation failures are logged and treated as no correlation.
    pub fn detect(&self, collections: &[CollectionSchema]) -> Vec<Correlation> {
        let mut field_to_collections: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for collection in collections {
            for (field_name, field) in &collection.fields {
                if is_correlation_candidate(field_name, field) {
                    field_to_collections
                        .entry(field_name.as_str())
                        .or_default()
                        .push(collection.name.clone());
                }
            }
        }

        let mut correlations = Vec::new();
        for (field_name, members) in field_to_collections {
            if members.len() < 2 {
                continue;
            }

            match self.validate(field_name, &members) {
                Ok(Some(overlap)) if overlap.confidence > self.config.correlation_threshold => {
                    debug!(
                        "Correlation on {} across {:?} ({})",
                        field_name, members, overlap.confidence
                    );
                    correlations.push(Correlation::new(
                        field_name,
                        members,
                        overlap.confidence,
                        overlap.matches,
                    ));
                }
                Ok(Some(overlap)) => {
                    debug!(
                        "Rejected correlation on {}: confidence {:.2}",
                        field_name, overlap.confidence
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to validate correlation field {}: {}", field_name, e);
                }
            }
        }

        correlations
    }

    fn validate(&self, field: &str, members: &[String]) -> Result<Option<Overlap>, StoreError> {
        let documents = self.store.aggregate(
            &members[0],
            &[
                Stage::Match(Filter::present(field)),
                Stage::Limit(self.config.correlation_sample_values),
                Stage::Project(vec![field.to_string()]),
            ],
        )?;

        let values: Vec<Bson> = documents
            .iter()
            .filter_map(|document| lookup(document, field))
            .filter(|value| !matches!(value, Bson::Null))
            .cloned()
            .collect();

        if values.is_empty() {
            return Ok(None);
        }

        let mut matches = 0u64;
        let mut checks = 0usize;
        for other in &members[1..] {
            matches += self.store.count_matching_in(other, field, &values)?;
            checks += values.len();
        }

        // Repeated values in the other collections can push the ratio past 1
        let confidence = round_confidence((matches as f64 / checks as f64).min(1.0));
        Ok(Some(Overlap {
            confidence,
            matches,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_candidates() {
        let indexed = FieldSchema::new(FieldType::String).with_index(false);
        assert!(is_correlation_candidate("event_tracking_ref", &indexed));
        assert!(is_correlation_candidate("CorrelationKey", &indexed));
        assert!(is_correlation_candidate("session_id", &indexed));
        assert!(!is_correlation_candidate("_id", &indexed));
        assert!(!is_correlation_candidate("name", &indexed));

        let not_indexed = FieldSchema::new(FieldType::String);
        assert!(!is_correlation_candidate("session_id", &not_indexed));

        let integer = FieldSchema::new(FieldType::Integer).with_index(false);
        assert!(!is_correlation_candidate("session_id", &integer));
    }
}

//! Schema generation runs
//!
//! A run analyzes each requested collection, detects relationships across the
//! set, merges the result into the persisted artifact and reports statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::{CollectionEntry, MergeStrategy, SchemaArtifact, merge_collections};
use crate::inference::{CollectionAnalyzer, CollectionSchema, InferenceConfig, InferenceError};
use crate::relationships::{CorrelationDetector, ForeignKeyDetector, RelationshipsSection};
use crate::storage::{SchemaStore, StorageError};
use crate::store::DocumentStore;

/// Errors that abort a generation run
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Failed to persist schemas: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    /// Short hint suitable for command-line output
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Inference(e) => e.user_message(),
            GenerationError::Storage(e) => e.user_message(),
            GenerationError::InvalidRequest(msg) => msg.clone(),
        }
    }
}

fn default_sample_size() -> usize {
    100
}

fn default_detect_relationships() -> bool {
    true
}

/// Parameters of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub collections: Vec<String>,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_detect_relationships")]
    pub detect_relationships: bool,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

impl GenerateRequest {
    /// Request with the default sample size, detection on and merge strategy
    pub fn new<I, T>(collections: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            collections: collections.into_iter().map(Into::into).collect(),
            sample_size: default_sample_size(),
            detect_relationships: default_detect_relationships(),
            merge_strategy: MergeStrategy::default(),
        }
    }

    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    pub fn detect_relationships(mut self, detect: bool) -> Self {
        self.detect_relationships = detect;
        self
    }

    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }
}

/// Aggregate figures of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub collections_analyzed: usize,
    /// Foreign keys plus correlations
    pub relationships_found: usize,
    /// Field definitions of the analyzed collections after merging
    pub total_fields: usize,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub success: bool,
    /// Persisted entries of the analyzed collections
    pub generated_schemas: BTreeMap<String, CollectionEntry>,
    pub relationships: Option<RelationshipsSection>,
    pub stats: GenerationStats,
    pub generated_at: DateTime<Utc>,
}

/// Generates and persists schemas for collections of a document store
pub struct SchemaGenerator<S: DocumentStore, W: SchemaStore> {
    store: S,
    schemas: W,
    config: InferenceConfig,
}

impl<S: DocumentStore, W: SchemaStore> SchemaGenerator<S, W> {
    pub fn new(store: S, schemas: W) -> Self {
        Self::with_config(store, schemas, InferenceConfig::default())
    }

    pub fn with_config(store: S, schemas: W, config: InferenceConfig) -> Self {
        Self {
            store,
            schemas,
            config,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schema_store(&self) -> &W {
        &self.schemas
    }

    /// Infer the schema of a single collection without persisting it
    pub fn analyze_collection(
        &self,
        collection: &str,
        sample_size: usize,
    ) -> Result<CollectionSchema, InferenceError> {
        CollectionAnalyzer::new(&self.store, &self.config).analyze(collection, sample_size)
    }

    /// Detect relationships among already analyzed collections
    pub fn detect_relationships(&self, collections: &[CollectionSchema]) -> RelationshipsSection {
        let foreign_keys = ForeignKeyDetector::new(&self.store, &self.config).detect(collections);
        let correlations = CorrelationDetector::new(&self.store, &self.config).detect(collections);
        RelationshipsSection::build(foreign_keys, correlations)
    }

    /// Run a generation: analyze, detect, merge and persist
    ///
    /// Failing to analyze a requested collection aborts the run before anything
    /// is written. Relationship validation failures only reduce what is found.
    pub fn generate(&self, request: &GenerateRequest) -> Result<GenerationReport, GenerationError> {
        self.config.validate()?;
        if request.collections.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "No collections specified".to_string(),
            ));
        }
        if request.sample_size == 0 {
            return Err(GenerationError::InvalidRequest(
                "Sample size must be at least 1".to_string(),
            ));
        }

        let mut names: Vec<&str> = Vec::with_capacity(request.collections.len());
        for name in &request.collections {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }

        let mut analyzed = Vec::with_capacity(names.len());
        for name in &names {
            info!("Analyzing collection: {}", name);
            analyzed.push(self.analyze_collection(name, request.sample_size)?);
        }

        let relationships = if request.detect_relationships && analyzed.len() > 1 {
            info!("Detecting relationships between {} collections", analyzed.len());
            Some(self.detect_relationships(&analyzed))
        } else {
            None
        };

        let fresh: BTreeMap<String, CollectionEntry> = analyzed
            .iter()
            .map(|schema| (schema.name.clone(), CollectionEntry::from(schema)))
            .collect();

        let strategy = request.merge_strategy;
        let run_relationships = relationships.clone();
        let artifact = self.schemas.update(move |existing| {
            let (existing_collections, existing_relationships, extra) = match existing {
                Some(artifact) => (artifact.collections, artifact.relationships, artifact.extra),
                None => Default::default(),
            };

            let mut artifact = SchemaArtifact::new(names.len());
            artifact.collections = merge_collections(existing_collections, fresh, strategy);
            artifact.relationships = run_relationships.or(existing_relationships);
            artifact.extra = extra;
            artifact
        })?;

        let generated_schemas: BTreeMap<String, CollectionEntry> = analyzed
            .iter()
            .filter_map(|schema| {
                artifact
                    .collections
                    .get(&schema.name)
                    .map(|entry| (schema.name.clone(), entry.clone()))
            })
            .collect();

        let stats = GenerationStats {
            collections_analyzed: analyzed.len(),
            relationships_found: relationships.as_ref().map_or(0, RelationshipsSection::len),
            total_fields: generated_schemas.values().map(|e| e.fields.len()).sum(),
        };

        info!(
            "Generated schemas for {} collection(s): {} fields, {} relationship(s)",
            stats.collections_analyzed, stats.total_fields, stats.relationships_found
        );

        Ok(GenerationReport {
            success: true,
            generated_schemas,
            relationships,
            stats,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySchemaStore;
    use crate::store::MemoryStore;
    use bson::doc;

    fn generator() -> SchemaGenerator<MemoryStore, MemorySchemaStore> {
        let mut store = MemoryStore::with_seed(1);
        store.insert_many(
            "customers",
            (1..=5).map(|i| doc! { "_id": i, "name": format!("c{}", i) }),
        );
        store.insert_many(
            "orders",
            (1..=10).map(|i| doc! { "_id": i, "customer_id": (i % 5) + 1 }),
        );
        SchemaGenerator::new(store, MemorySchemaStore::new())
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"collections": ["orders"]}"#).unwrap();
        assert_eq!(request, GenerateRequest::new(["orders"]));
        assert_eq!(request.sample_size, 100);
        assert!(request.detect_relationships);
        assert_eq!(request.merge_strategy, MergeStrategy::Merge);
    }

    #[test]
    fn test_empty_request_rejected() {
        let generator = generator();
        let request = GenerateRequest::new(Vec::<String>::new());
        assert!(matches!(
            generator.generate(&request),
            Err(GenerationError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_single_collection_skips_detection() {
        let generator = generator();
        let report = generator.generate(&GenerateRequest::new(["orders"])).unwrap();
        assert!(report.relationships.is_none());
        assert_eq!(report.stats.relationships_found, 0);
        assert_eq!(report.stats.total_fields, 2);
    }

    #[test]
    fn test_duplicate_names_analyzed_once() {
        let generator = generator();
        let report = generator
            .generate(&GenerateRequest::new(["orders", "orders", "customers"]))
            .unwrap();
        assert_eq!(report.stats.collections_analyzed, 2);
        assert_eq!(report.stats.relationships_found, 1);
    }

    #[test]
    fn test_missing_collection_is_fatal() {
        let generator = generator();
        let result = generator.generate(&GenerateRequest::new(["orders", "nope"]));
        assert!(matches!(
            result,
            Err(GenerationError::Inference(InferenceError::Store { .. }))
        ));
        assert!(generator.schema_store().read().unwrap().is_none());
    }
}

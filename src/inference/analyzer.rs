//! Field type analysis over sampled documents

use std::collections::{BTreeMap, BTreeSet};

use bson::{Bson, Document};
use serde_json::Value;
use tracing::{debug, info};

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::formats::{describe_field, is_iso_datetime};
use super::indexes::detect_indexes;
use super::types::{CollectionSchema, FieldAnalysis, FieldSchema, FieldType, ItemsSchema};
use crate::store::{DocumentStore, Filter};

/// Classify a single value
///
/// Precedence: null, boolean, integer, floating point, string (date-time strings
/// become `date`), array, embedded document, identifier, native date.
pub fn classify(value: &Bson) -> FieldType {
    match value {
        Bson::Null => FieldType::Null,
        Bson::Boolean(_) => FieldType::Boolean,
        Bson::Int32(_) | Bson::Int64(_) => FieldType::Integer,
        Bson::Double(_) => FieldType::Number,
        Bson::String(s) if is_iso_datetime(s) => FieldType::Date,
        Bson::String(_) => FieldType::String,
        Bson::Array(_) => FieldType::Array,
        Bson::Document(_) => FieldType::Object,
        Bson::ObjectId(_) => FieldType::ObjectId,
        Bson::DateTime(_) => FieldType::Date,
        _ => FieldType::Unknown,
    }
}

#[derive(Debug, Default)]
struct FieldStats {
    /// Type counts in first-seen order
    types: Vec<(FieldType, usize)>,
    values: Vec<Bson>,
    present_count: usize,
    null_count: usize,
}

impl FieldStats {
    fn record_type(&mut self, field_type: FieldType) {
        match self.types.iter_mut().find(|(t, _)| *t == field_type) {
            Some((_, count)) => *count += 1,
            None => self.types.push((field_type, 1)),
        }
    }

    fn primary_type(&self) -> FieldType {
        majority(&self.types).unwrap_or(FieldType::Unknown)
    }
}

/// Most frequent entry; ties keep the earliest
fn majority(counts: &[(FieldType, usize)]) -> Option<FieldType> {
    let mut best: Option<(FieldType, usize)> = None;
    for &(field_type, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((field_type, count)),
        }
    }
    best.map(|(field_type, _)| field_type)
}

/// Accumulates per-field statistics over a set of documents
pub struct FieldAnalyzer {
    config: InferenceConfig,
    fields: BTreeMap<String, FieldStats>,
    document_count: usize,
}

impl FieldAnalyzer {
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            config,
            fields: BTreeMap::new(),
            document_count: 0,
        }
    }

    /// Add one sampled document
    pub fn add_document(&mut self, document: &Document) {
        self.document_count += 1;
        self.collect(document, "", 0);
    }

    pub fn add_documents<'a>(&mut self, documents: impl IntoIterator<Item = &'a Document>) {
        for document in documents {
            self.add_document(document);
        }
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    fn collect(&mut self, document: &Document, prefix: &str, depth: usize) {
        for (key, value) in document {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            let max_values = self.config.max_sample_values;
            let stats = self.fields.entry(path.clone()).or_default();

            if matches!(value, Bson::Null) {
                stats.null_count += 1;
                continue;
            }

            stats.present_count += 1;
            let value_type = classify(value);
            stats.record_type(value_type);

            if value_type.keeps_samples() && stats.values.len() < max_values {
                stats.values.push(value.clone());
            }

            if let Bson::Document(inner) = value
                && self.config.flatten_nested
                && depth < self.config.max_depth
            {
                self.collect(inner, &path, depth + 1);
            }
        }
    }

    /// Compute the analysis for every field seen
    pub fn finalize(self) -> BTreeMap<String, FieldAnalysis> {
        let total = self.document_count;
        self.fields
            .into_iter()
            .map(|(name, stats)| {
                let analysis = analyze_field(&stats, total, &self.config);
                (name, analysis)
            })
            .collect()
    }
}

impl Default for FieldAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn analyze_field(stats: &FieldStats, total: usize, config: &InferenceConfig) -> FieldAnalysis {
    let primary_type = stats.primary_type();

    let presence_rate = if total > 0 {
        stats.present_count as f64 / total as f64
    } else {
        0.0
    };

    let example = if config.collect_examples {
        stats.values.first().map(example_value)
    } else {
        None
    };

    let enum_values = if config.detect_enums && primary_type == FieldType::String {
        let distinct: BTreeSet<&str> = stats.values.iter().filter_map(Bson::as_str).collect();
        (distinct.len() > 1 && distinct.len() <= config.max_enum_values)
            .then(|| distinct.into_iter().map(str::to_string).collect())
    } else {
        None
    };

    let items_type = if primary_type == FieldType::Array {
        let mut item_types: Vec<(FieldType, usize)> = Vec::new();
        for value in &stats.values {
            if let Bson::Array(items) = value
                && let Some(first) = items.first()
            {
                let item_type = classify(first);
                match item_types.iter_mut().find(|(t, _)| *t == item_type) {
                    Some((_, count)) => *count += 1,
                    None => item_types.push((item_type, 1)),
                }
            }
        }
        majority(&item_types)
    } else {
        None
    };

    FieldAnalysis {
        primary_type,
        presence_rate,
        present_count: stats.present_count,
        null_count: stats.null_count,
        example,
        enum_values,
        items_type,
    }
}

/// Convert a sampled value to the JSON written as `example`
pub fn example_value(value: &Bson) -> Value {
    match value {
        Bson::String(s) => Value::String(s.clone()),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        other => other.clone().into_relaxed_extjson(),
    }
}

/// Analyzes collections of a document store
pub struct CollectionAnalyzer<'a, S: DocumentStore> {
    store: &'a S,
    config: &'a InferenceConfig,
}

impl<'a, S: DocumentStore> CollectionAnalyzer<'a, S> {
    pub fn new(store: &'a S, config: &'a InferenceConfig) -> Self {
        Self { store, config }
    }

    /// Infer the schema of `collection` from a random sample of `sample_size` documents
    pub fn analyze(
        &self,
        collection: &str,
        sample_size: usize,
    ) -> Result<CollectionSchema, InferenceError> {
        let total = self
            .store
            .count(collection, &Filter::All)
            .map_err(|e| InferenceError::store(collection, e))?;

        if total == 0 {
            info!("Collection {} is empty", collection);
            return Ok(CollectionSchema::empty(collection));
        }

        let sampled = (sample_size as u64).min(total);
        let documents = self
            .store
            .sample(collection, sampled as usize)
            .map_err(|e| InferenceError::store(collection, e))?;

        debug!(
            "Sampled {} of {} documents from {}",
            documents.len(),
            total,
            collection
        );

        let mut analyzer = FieldAnalyzer::with_config(self.config.clone());
        analyzer.add_documents(&documents);
        let analysis = analyzer.finalize();

        let indexes = detect_indexes(self.store, collection)
            .map_err(|e| InferenceError::store(collection, e))?;

        let mut flat: BTreeMap<String, FieldSchema> = analysis
            .iter()
            .map(|(name, field)| {
                let mut schema = FieldSchema::new(field.primary_type)
                    .with_description(describe_field(name));
                if let Some(index) = indexes.iter().find(|index| &index.field == name) {
                    schema = schema.with_index(index.unique);
                }
                schema.enum_values = field
                    .enum_values
                    .as_ref()
                    .map(|values| values.iter().cloned().map(Value::String).collect());
                schema.example = field.example.clone();
                schema.items = field.items_type.map(ItemsSchema::new);
                (name.clone(), schema)
            })
            .collect();

        if self.config.flatten_nested {
            attach_properties(&mut flat);
        }

        info!(
            "Analyzed {}: {} fields from {} sampled documents",
            collection,
            flat.len(),
            sampled
        );

        Ok(CollectionSchema {
            name: collection.to_string(),
            description: format!("Auto-generated schema for {} collection", collection),
            fields: flat,
            indexes: indexes.into_iter().map(|index| index.field).collect(),
            total_documents: total,
            sampled_documents: sampled,
            analysis,
        })
    }
}

/// Give every object field a `properties` map of its direct children
fn attach_properties(fields: &mut BTreeMap<String, FieldSchema>) {
    let object_paths: Vec<String> = fields
        .iter()
        .filter(|(_, field)| field.field_type == FieldType::Object)
        .map(|(name, _)| name.clone())
        .collect();

    let snapshot = fields.clone();
    for path in object_paths {
        let properties = nested_properties(&snapshot, &path);
        if !properties.is_empty()
            && let Some(field) = fields.get_mut(&path)
        {
            field.properties = Some(properties);
        }
    }
}

fn nested_properties(
    flat: &BTreeMap<String, FieldSchema>,
    parent: &str,
) -> BTreeMap<String, FieldSchema> {
    let prefix = format!("{}.", parent);
    flat.iter()
        .filter_map(|(path, field)| {
            let child = path.strip_prefix(&prefix)?;
            if child.contains('.') {
                return None;
            }
            let mut field = field.clone();
            field.description = Some(describe_field(child));
            if field.field_type == FieldType::Object {
                let grandchildren = nested_properties(flat, path);
                if !grandchildren.is_empty() {
                    field.properties = Some(grandchildren);
                }
            }
            Some((child.to_string(), field))
        })
        .collect()
}

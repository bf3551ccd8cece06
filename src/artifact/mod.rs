//! Schema artifact
//!
//! The persisted JSON document holding every collection schema and the detected
//! relationships. Generation runs create and update it; downstream consumers
//! only read it, typically through [`SchemaArtifact::summary`], the
//! structure-only text handed to a query translator.

mod merge;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::inference::{CollectionSchema, FieldSchema};
use crate::relationships::RelationshipsSection;

pub use merge::{MergeStrategy, ParseMergeStrategyError, merge_collections};

/// Root of the persisted schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaArtifact {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<RelationshipsSection>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One collection as persisted: description and field definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSchema>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Index information read back from field flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIndex {
    pub field: String,
    pub unique: bool,
}

impl From<&CollectionSchema> for CollectionEntry {
    fn from(schema: &CollectionSchema) -> Self {
        Self {
            description: schema.description.clone(),
            fields: schema.fields.clone(),
            extra: serde_json::Map::new(),
        }
    }
}

impl CollectionEntry {
    /// Indexed fields, from the `indexed`/`unique` flags
    pub fn indexes(&self) -> Vec<FieldIndex> {
        self.fields
            .iter()
            .filter(|(_, field)| field.indexed)
            .map(|(name, field)| FieldIndex {
                field: name.clone(),
                unique: field.unique,
            })
            .collect()
    }
}

impl SchemaArtifact {
    /// Artifact with the run description for `collection_count` collections
    pub fn new(collection_count: usize) -> Self {
        Self {
            description: format!(
                "Auto-generated schemas for {} collection(s)",
                collection_count
            ),
            collections: BTreeMap::new(),
            relationships: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Parse an artifact from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize as pretty JSON indented by four spaces
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionEntry> {
        self.collections.get(name)
    }

    /// Total number of field definitions across collections
    pub fn field_count(&self) -> usize {
        self.collections.values().map(|c| c.fields.len()).sum()
    }

    /// Human-readable structure of one collection, without data values
    pub fn collection_summary(&self, name: &str) -> String {
        let Some(entry) = self.collections.get(name) else {
            return format!("Schema not found for collection: {}", name);
        };

        let mut out = String::new();
        let _ = writeln!(out, "Collection: {}", name);
        let description = if entry.description.is_empty() {
            "N/A"
        } else {
            entry.description.as_str()
        };
        let _ = writeln!(out, "Description: {}\n", description);
        out.push_str("Fields:\n");

        for (field_name, field) in &entry.fields {
            let _ = writeln!(
                out,
                "  - {} ({}): {}",
                field_name,
                field.field_type,
                field.description.as_deref().unwrap_or("")
            );

            if let Some(properties) = &field.properties {
                for (prop_name, prop) in properties {
                    let _ = writeln!(
                        out,
                        "    - {}.{} ({})",
                        field_name, prop_name, prop.field_type
                    );
                }
            }

            if let Some(items) = &field.items {
                let _ = writeln!(out, "    (array of {})", items.item_type);
            }

            if let Some(values) = &field.enum_values {
                let values: Vec<String> = values
                    .iter()
                    .map(|value| match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                let _ = writeln!(out, "    Allowed values: {}", values.join(", "));
            }
        }

        out.push_str("\nIndexes:\n");
        for index in entry.indexes() {
            let unique = if index.unique { " (unique)" } else { "" };
            let _ = writeln!(out, "  - {}{}", index.field, unique);
        }

        out
    }

    /// Summary of every collection
    pub fn summary(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::from("Available Collections:\n\n");

        for (name, entry) in &self.collections {
            let description = if entry.description.is_empty() {
                "N/A"
            } else {
                entry.description.as_str()
            };
            let _ = writeln!(out, "• {}: {}", name, description);
        }
        let _ = write!(out, "\n{}\n\n", rule);

        for name in self.collections.keys() {
            out.push_str(&self.collection_summary(name));
            let _ = write!(out, "\n{}\n\n", rule);
        }

        out
    }
}

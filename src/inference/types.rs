//! Inferred schema types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of a field as reported in the schema artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    /// ISO date-time strings and native date values
    Date,
    Array,
    Object,
    /// The store's native primary-key identifier
    ObjectId,
    /// Anything else, including types written by hand that this crate does not know
    #[serde(other)]
    #[default]
    Unknown,
}

impl FieldType {
    /// Name used in the artifact
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::ObjectId => "objectId",
            FieldType::Unknown => "unknown",
        }
    }

    /// Whether sample values of this type are retained for enums and examples
    pub fn keeps_samples(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Integer | FieldType::Boolean | FieldType::Array
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Item type of an array field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsSchema {
    #[serde(rename = "type", default)]
    pub item_type: FieldType,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ItemsSchema {
    pub fn new(item_type: FieldType) -> Self {
        Self {
            item_type,
            extra: serde_json::Map::new(),
        }
    }
}

/// Schema of a single field
///
/// Keys this crate does not produce (added by hand to the artifact) are kept
/// in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// `unknown` when a hand-written definition omits it
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    /// Generated enums hold strings; hand-written ones may hold any JSON value
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FieldSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSchema>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldSchema {
    /// Create a field schema with only a type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            description: None,
            indexed: false,
            unique: false,
            enum_values: None,
            example: None,
            properties: None,
            items: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field indexed, and unique if the index enforces it
    pub fn with_index(mut self, unique: bool) -> Self {
        self.indexed = true;
        self.unique = unique;
        self
    }
}

/// Per-field statistics from a sampled collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnalysis {
    /// Most frequent non-null type; ties go to the type seen first
    pub primary_type: FieldType,
    /// Non-null sightings divided by sampled documents
    pub presence_rate: f64,
    pub present_count: usize,
    pub null_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Sorted distinct string values, when few enough
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Majority type of the first element of sampled arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_type: Option<FieldType>,
}

/// Inferred schema of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub description: String,
    pub fields: BTreeMap<String, FieldSchema>,
    /// Indexed field names in catalog order, `_id` included
    pub indexes: Vec<String>,
    pub total_documents: u64,
    /// Always `min(sample_size, total_documents)`
    pub sampled_documents: u64,
    /// Raw statistics behind `fields`; not persisted
    #[serde(skip)]
    pub analysis: BTreeMap<String, FieldAnalysis>,
}

impl CollectionSchema {
    /// Schema for a collection without documents
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Collection {} (empty)", name),
            fields: BTreeMap::new(),
            indexes: Vec::new(),
            total_documents: 0,
            sampled_documents: 0,
            analysis: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Fields that are both present in the sample and indexed
    pub fn indexed_fields(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.fields.iter().filter(|(_, field)| field.indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_names() {
        assert_eq!(
            serde_json::to_value(FieldType::ObjectId).unwrap(),
            json!("objectId")
        );
        assert_eq!(FieldType::Date.to_string(), "date");
        let parsed: FieldType = serde_json::from_value(json!("decimal")).unwrap();
        assert_eq!(parsed, FieldType::Unknown);
    }

    #[test]
    fn test_field_schema_omits_defaults() {
        let field = FieldSchema::new(FieldType::String).with_description("Status");
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({"type": "string", "description": "Status"})
        );
    }

    #[test]
    fn test_field_schema_keeps_unknown_keys() {
        let raw = json!({
            "type": "string",
            "indexed": true,
            "enum": ["a", "b"],
            "note": "edited by hand"
        });
        let field: FieldSchema = serde_json::from_value(raw.clone()).unwrap();
        assert!(field.indexed);
        assert!(!field.unique);
        assert_eq!(field.extra.get("note"), Some(&json!("edited by hand")));
        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn test_field_schema_accepts_hand_edits() {
        let field: FieldSchema =
            serde_json::from_value(json!({"enum": [1, 2, 3], "description": "Priority"}))
                .unwrap();
        assert_eq!(field.field_type, FieldType::Unknown);
        assert_eq!(field.enum_values, Some(vec![json!(1), json!(2), json!(3)]));
    }

    #[test]
    fn test_empty_collection_schema() {
        let schema = CollectionSchema::empty("logs");
        assert_eq!(schema.description, "Collection logs (empty)");
        assert!(schema.fields.is_empty());
        assert!(schema.indexes.is_empty());
    }
}

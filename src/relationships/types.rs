//! Relationship types and the persisted relationships section

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cardinality of a foreign-key link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    ManyToOne,
    ManyToMany,
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipType::ManyToOne => write!(f, "many-to-one"),
            RelationshipType::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// Directional foreign-key link `from` -> `to` via `field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub field: String,
    pub description: String,
    /// Matched fraction of checked values, rounded to two decimals
    pub confidence: f64,
}

impl Relationship {
    pub fn new(
        from: &str,
        to: &str,
        field: &str,
        relationship_type: RelationshipType,
        confidence: f64,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            relationship_type,
            field: field.to_string(),
            description: format!("{} references {} via {}", from, to, field),
            confidence: round_confidence(confidence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationTag {
    #[default]
    Correlation,
}

/// Undirected grouping of collections sharing a field with overlapping values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    #[serde(rename = "type")]
    pub tag: CorrelationTag,
    pub field: String,
    /// Contributing collections; the first supplied the sampled values
    pub collections: Vec<String>,
    pub description: String,
    pub confidence: f64,
    /// Raw number of matching documents across the other collections
    pub sample_overlap: u64,
}

impl Correlation {
    pub fn new(field: &str, collections: Vec<String>, confidence: f64, sample_overlap: u64) -> Self {
        Self {
            tag: CorrelationTag::Correlation,
            field: field.to_string(),
            collections,
            description: format!("Collections linked via shared {} field", field),
            confidence,
            sample_overlap,
        }
    }
}

/// Either kind of link, as listed under `links`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
    ForeignKey(Relationship),
    Correlation(Correlation),
}

/// The `relationships` block of the schema artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipsSection {
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub correlations: Vec<Correlation>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_queries: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RelationshipsSection {
    /// Build the section from detector output
    ///
    /// Example queries cover the first two foreign keys and the first two correlations.
    pub fn build(foreign_keys: Vec<Relationship>, correlations: Vec<Correlation>) -> Self {
        let total = foreign_keys.len() + correlations.len();
        if total == 0 {
            return Self {
                description: "No relationships detected between collections".to_string(),
                foreign_keys: Vec::new(),
                correlations: Vec::new(),
                links: Vec::new(),
                example_queries: Vec::new(),
                extra: serde_json::Map::new(),
            };
        }

        let mut example_queries = Vec::new();
        for rel in foreign_keys.iter().take(2) {
            example_queries.push(format!(
                "Find {from} by {to}: db.{from}.find({{{field}: '<id>'}})",
                from = rel.from,
                to = rel.to,
                field = rel.field
            ));
            example_queries.push(format!(
                "Join {from} with {to}: db.{from}.aggregate([{{$lookup: {{from: '{to}', localField: '{field}', foreignField: '_id', as: '{to}_data'}}}}])",
                from = rel.from,
                to = rel.to,
                field = rel.field
            ));
        }
        for corr in correlations.iter().take(2) {
            if corr.collections.len() < 2 {
                continue;
            }
            example_queries.push(format!(
                "Find related records via {field}: db.{first}.find({{{field}: '<value>'}})",
                field = corr.field,
                first = corr.collections[0]
            ));
            example_queries.push(format!(
                "Correlate {list} via {field}: Use {field} to link records across collections",
                list = corr.collections.join(", "),
                field = corr.field
            ));
        }

        let links = foreign_keys
            .iter()
            .cloned()
            .map(Link::ForeignKey)
            .chain(correlations.iter().cloned().map(Link::Correlation))
            .collect();

        Self {
            description: format!("Detected {} relationship(s) between collections", total),
            foreign_keys,
            correlations,
            links,
            example_queries,
            extra: serde_json::Map::new(),
        }
    }

    /// Number of links, the figure reported as relationships found
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Round to two decimals
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn customer_fk() -> Relationship {
        Relationship::new(
            "orders",
            "customers",
            "customer_id",
            RelationshipType::ManyToOne,
            0.9,
        )
    }

    #[test]
    fn test_relationship_json_shape() {
        assert_eq!(
            serde_json::to_value(customer_fk()).unwrap(),
            json!({
                "from": "orders",
                "to": "customers",
                "type": "many-to-one",
                "field": "customer_id",
                "description": "orders references customers via customer_id",
                "confidence": 0.9
            })
        );
    }

    #[test]
    fn test_confidence_rounding() {
        let rel = Relationship::new("a", "b", "b_id", RelationshipType::ManyToMany, 2.0 / 3.0);
        assert_eq!(rel.confidence, 0.67);
    }

    #[test]
    fn test_empty_section() {
        let section = RelationshipsSection::build(Vec::new(), Vec::new());
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({
                "description": "No relationships detected between collections",
                "links": []
            })
        );
        assert!(section.is_empty());
    }

    #[test]
    fn test_section_example_queries() {
        let corr = Correlation::new(
            "trace_id",
            vec!["events".to_string(), "logs".to_string()],
            0.75,
            15,
        );
        let section = RelationshipsSection::build(vec![customer_fk()], vec![corr]);

        assert_eq!(section.len(), 2);
        assert_eq!(
            section.description,
            "Detected 2 relationship(s) between collections"
        );
        assert_eq!(
            section.example_queries,
            vec![
                "Find orders by customers: db.orders.find({customer_id: '<id>'})".to_string(),
                "Join orders with customers: db.orders.aggregate([{$lookup: {from: 'customers', localField: 'customer_id', foreignField: '_id', as: 'customers_data'}}])".to_string(),
                "Find related records via trace_id: db.events.find({trace_id: '<value>'})".to_string(),
                "Correlate events, logs via trace_id: Use trace_id to link records across collections".to_string(),
            ]
        );
    }

    #[test]
    fn test_links_deserialize_both_kinds() {
        let raw = json!([
            {"from": "a", "to": "b", "type": "many-to-one", "field": "b_id",
             "description": "a references b via b_id", "confidence": 1.0},
            {"type": "correlation", "field": "trace_id", "collections": ["a", "b"],
             "description": "Collections linked via shared trace_id field",
             "confidence": 0.6, "sample_overlap": 12}
        ]);
        let links: Vec<Link> = serde_json::from_value(raw).unwrap();
        assert!(matches!(links[0], Link::ForeignKey(_)));
        assert!(matches!(links[1], Link::Correlation(_)));
    }
}

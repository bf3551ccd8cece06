//! Output formatting for CLI

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::artifact::SchemaArtifact;
use crate::cli::error::CliError;
use crate::generator::GenerationReport;
use crate::relationships::Link;

/// Format a generation report for the terminal
pub fn format_report_text(report: &GenerationReport, schema_file: &Path) -> String {
    let mut output = String::new();
    let stats = &report.stats;

    output.push_str("✅ Schema generation complete\n");
    let _ = writeln!(output, "Collections analyzed: {}", stats.collections_analyzed);
    let _ = writeln!(output, "Relationships found: {}", stats.relationships_found);
    let _ = writeln!(output, "Total fields: {}", stats.total_fields);

    if let Some(section) = &report.relationships
        && !section.links.is_empty()
    {
        output.push_str("\nRelationships:\n");
        for link in &section.links {
            match link {
                Link::ForeignKey(rel) => {
                    let _ = writeln!(
                        output,
                        "  - {} -> {} via {} ({}, confidence {:.2})",
                        rel.from, rel.to, rel.field, rel.relationship_type, rel.confidence
                    );
                }
                Link::Correlation(corr) => {
                    let _ = writeln!(
                        output,
                        "  - {} shared by {} (confidence {:.2})",
                        corr.field,
                        corr.collections.join(", "),
                        corr.confidence
                    );
                }
            }
        }
    }

    let _ = write!(output, "\nSchemas saved to: {}", schema_file.display());
    output
}

/// Format a generation report as pretty JSON
pub fn format_report_json(report: &GenerationReport) -> Result<String, CliError> {
    serde_json::to_string_pretty(report).map_err(|e| CliError::Output(e.to_string()))
}

/// The artifact, or one collection of it, as JSON
pub fn format_artifact_json(
    artifact: &SchemaArtifact,
    collection: Option<&str>,
) -> Result<String, CliError> {
    match collection.and_then(|name| artifact.collection(name)) {
        Some(entry) => to_json(entry),
        None => artifact.to_json().map_err(|e| CliError::Output(e.to_string())),
    }
}

/// The artifact, or one collection of it, as YAML
pub fn format_artifact_yaml(
    artifact: &SchemaArtifact,
    collection: Option<&str>,
) -> Result<String, CliError> {
    let result = match collection.and_then(|name| artifact.collection(name)) {
        Some(entry) => serde_yaml::to_string(entry),
        None => serde_yaml::to_string(artifact),
    };
    result.map_err(|e| CliError::Output(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationStats;
    use crate::relationships::{Relationship, RelationshipType, RelationshipsSection};
    use std::collections::BTreeMap;

    #[test]
    fn test_report_text() {
        let section = RelationshipsSection::build(
            vec![Relationship::new(
                "orders",
                "customers",
                "customer_id",
                RelationshipType::ManyToOne,
                1.0,
            )],
            Vec::new(),
        );
        let report = GenerationReport {
            success: true,
            generated_schemas: BTreeMap::new(),
            relationships: Some(section),
            stats: GenerationStats {
                collections_analyzed: 2,
                relationships_found: 1,
                total_fields: 7,
            },
            generated_at: chrono::Utc::now(),
        };

        let text = format_report_text(&report, Path::new("data/schemas.json"));
        assert!(text.contains("Collections analyzed: 2\n"));
        assert!(text.contains("  - orders -> customers via customer_id (many-to-one, confidence 1.00)"));
        assert!(text.ends_with("Schemas saved to: data/schemas.json"));
    }

    #[test]
    fn test_artifact_yaml() {
        let yaml = format_artifact_yaml(&SchemaArtifact::new(0), None).unwrap();
        assert!(yaml.contains("description:"));
        assert!(yaml.contains("Auto-generated schemas for 0 collection(s)"));
    }
}

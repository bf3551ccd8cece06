//! Generate command implementation

use std::path::Path;

use tracing::info;

use crate::artifact::MergeStrategy;
use crate::cli::commands::Connection;
use crate::cli::error::CliError;
use crate::cli::output::{format_report_json, format_report_text};
use crate::generator::{GenerateRequest, SchemaGenerator};
use crate::inference::InferenceConfig;
use crate::storage::FileSchemaStore;

#[derive(Debug, Clone, clap::Args)]
pub struct GenerateArgs {
    /// Collections to analyze (default: all collections)
    pub collections: Vec<String>,

    /// Documents sampled per collection
    #[arg(short, long)]
    pub sample_size: Option<usize>,

    /// Skip foreign-key and correlation detection
    #[arg(long)]
    pub no_relationships: bool,

    /// merge keeps persisted field definitions, overwrite replaces them
    #[arg(long, default_value = "merge")]
    pub strategy: MergeStrategy,

    /// Record only structure: no enum values or examples
    #[arg(long)]
    pub structure_only: bool,

    /// Record nested fields with dot notation
    #[arg(long)]
    pub flatten_nested: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle the generate command
pub fn handle_generate(
    connection: &Connection,
    schema_file: &Path,
    mut config: InferenceConfig,
    args: &GenerateArgs,
) -> Result<(), CliError> {
    if args.structure_only {
        config.detect_enums = false;
        config.collect_examples = false;
    }
    if args.flatten_nested {
        config.flatten_nested = true;
    }

    let store = connection.connect()?;
    let available = store.collection_names()?;

    let collections = if args.collections.is_empty() {
        available.clone()
    } else {
        let missing: Vec<String> = args
            .collections
            .iter()
            .filter(|name| !available.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(CliError::CollectionsNotFound { missing, available });
        }
        args.collections.clone()
    };

    if collections.is_empty() {
        return Err(CliError::InvalidArgument(
            "The database has no collections".to_string(),
        ));
    }

    let request = GenerateRequest::new(collections)
        .sample_size(args.sample_size.unwrap_or(config.sample_size))
        .detect_relationships(!args.no_relationships)
        .merge_strategy(args.strategy);

    info!(
        "Generating schemas for {} collection(s) into {}",
        request.collections.len(),
        schema_file.display()
    );

    let generator = SchemaGenerator::with_config(store, FileSchemaStore::at(schema_file), config);
    let report = generator.generate(&request)?;

    let rendered = if args.json {
        format_report_json(&report)?
    } else {
        format_report_text(&report, schema_file)
    };
    println!("{}", rendered);
    Ok(())
}

//! Show command implementation

use std::path::Path;

use crate::cli::error::CliError;
use crate::cli::output::{format_artifact_json, format_artifact_yaml};
use crate::storage::{FileSchemaStore, SchemaStore, StorageError};

/// How the artifact is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ShowFormat {
    /// Structure-only text, as handed to a query translator
    #[default]
    Summary,
    Json,
    Yaml,
}

/// Handle the show command
pub fn handle_show(
    schema_file: &Path,
    collection: Option<&str>,
    format: ShowFormat,
) -> Result<(), CliError> {
    let store = FileSchemaStore::at(schema_file);
    let artifact = store
        .read()?
        .ok_or_else(|| StorageError::FileNotFound(schema_file.display().to_string()))?;

    if let Some(name) = collection
        && artifact.collection(name).is_none()
    {
        return Err(CliError::CollectionsNotFound {
            missing: vec![name.to_string()],
            available: artifact
                .collection_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        });
    }

    let rendered = match (format, collection) {
        (ShowFormat::Summary, Some(name)) => artifact.collection_summary(name),
        (ShowFormat::Summary, None) => artifact.summary(),
        (ShowFormat::Json, _) => format_artifact_json(&artifact, collection)?,
        (ShowFormat::Yaml, _) => format_artifact_yaml(&artifact, collection)?,
    };

    println!("{}", rendered);
    Ok(())
}

//! CLI command implementations

pub mod collections;
pub mod generate;
pub mod show;

use std::path::Path;

use tracing::debug;

use crate::cli::error::CliError;
use crate::inference::InferenceConfig;
use crate::store::MongoStore;

pub use collections::handle_collections;
pub use generate::{GenerateArgs, handle_generate};
pub use show::{ShowFormat, handle_show};

/// Connection settings shared by commands that talk to the database
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub mongo_uri: Option<String>,
    pub db_name: Option<String>,
}

impl Connection {
    pub fn connect(&self) -> Result<MongoStore, CliError> {
        let uri = self
            .mongo_uri
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CliError::MissingConfig("MONGO_URI"))?;
        let db = self
            .db_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CliError::MissingConfig("DB_NAME"))?;
        Ok(MongoStore::connect(uri, db)?)
    }
}

/// Load an inference configuration from a TOML file, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<InferenceConfig, CliError> {
    let Some(path) = path else {
        return Ok(InferenceConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))?;
    let config: InferenceConfig = toml::from_str(&content)
        .map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))?;
    config
        .validate()
        .map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))?;

    debug!("Loaded inference config from {}", path.display());
    Ok(config)
}

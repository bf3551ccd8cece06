//! MongoDB document store
//!
//! Implements DocumentStore on top of the async MongoDB driver. The engine is
//! synchronous, so the store owns a tokio runtime and blocks on each call.

use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::info;

use super::{DocumentStore, Filter, IndexSpec, Stage, StoreError};

/// MongoDB-backed document store
pub struct MongoStore {
    database: Database,
    runtime: tokio::runtime::Runtime,
}

impl MongoStore {
    /// Connect to `uri` and bind to `database`
    pub fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Connection(format!("Failed to start runtime: {}", e)))?;

        let client = runtime
            .block_on(async { Client::with_uri_str(uri).await })
            .map_err(|e| StoreError::Connection(format!("Failed to connect to {}: {}", uri, e)))?;

        info!("Connected to MongoDB database {}", database);

        Ok(Self {
            database: client.database(database),
            runtime,
        })
    }

    /// Names of all collections in the database
    pub fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.runtime
            .block_on(async { self.database.list_collection_names().await })
            .map_err(query_error)
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

impl DocumentStore for MongoStore {
    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let coll = self.collection(collection);
        self.runtime
            .block_on(async { coll.count_documents(filter_document(filter)).await })
            .map_err(query_error)
    }

    fn sample(&self, collection: &str, size: usize) -> Result<Vec<Document>, StoreError> {
        self.aggregate(collection, &[Stage::Sample(size)])
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let stages: Vec<Document> = pipeline.iter().map(stage_document).collect();

        self.runtime
            .block_on(async {
                let cursor = coll.aggregate(stages).await?;
                cursor.try_collect::<Vec<Document>>().await
            })
            .map_err(query_error)
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<IndexSpec>, StoreError> {
        let coll = self.collection(collection);
        let models: Vec<IndexModel> = self
            .runtime
            .block_on(async {
                let cursor = coll.list_indexes().await?;
                cursor.try_collect::<Vec<IndexModel>>().await
            })
            .map_err(query_error)?;

        Ok(models
            .into_iter()
            .map(|model| {
                let name = model
                    .options
                    .as_ref()
                    .and_then(|o| o.name.clone())
                    .unwrap_or_default();
                let unique = model
                    .options
                    .as_ref()
                    .and_then(|o| o.unique)
                    .unwrap_or(false);
                IndexSpec {
                    name,
                    keys: model.keys.keys().cloned().collect(),
                    unique,
                }
            })
            .collect())
    }
}

fn query_error(e: mongodb::error::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn filter_document(filter: &Filter) -> Document {
    let mut document = Document::new();
    match filter {
        Filter::All => {}
        Filter::Present(field) => {
            document.insert(field.clone(), doc! { "$ne": Bson::Null, "$exists": true });
        }
        Filter::In { field, values } => {
            document.insert(field.clone(), doc! { "$in": values.clone() });
        }
    }
    document
}

fn stage_document(stage: &Stage) -> Document {
    match stage {
        Stage::Match(filter) => doc! { "$match": filter_document(filter) },
        Stage::Limit(limit) => doc! { "$limit": *limit as i64 },
        Stage::Project(fields) => {
            let mut projection = Document::new();
            for field in fields {
                projection.insert(field.clone(), 1);
            }
            doc! { "$project": projection }
        }
        Stage::Sample(size) => doc! { "$sample": { "size": *size as i64 } },
    }
}

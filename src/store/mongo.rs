use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

use crate::config::DocumentConfig;
use crate::error::{GriddleError, Result};
use crate::store::DocumentStore;

/// Document store adapter over the driver's pooled client.
///
/// There is deliberately no secondary fallback client: reconnection is the
/// driver pool's job, and any connectivity failure surfaces as
/// `BackendUnavailable` for caller-level retry.
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    pub async fn connect(config: &DocumentConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.max_pool_size = Some(config.max_pool_size);
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));
        let client = Client::with_options(options)?;
        Ok(Self {
            db: client.database(&config.database),
        })
    }

    fn to_document(value: &serde_json::Value) -> Result<Document> {
        mongodb::bson::to_document(value).map_err(|e| GriddleError::Json(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn collection_names(&self) -> Result<Vec<String>> {
        Ok(self.db.list_collection_names(None).await?)
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>> {
        let coll = self.db.collection::<Document>(collection);
        Ok(coll.list_index_names().await?)
    }

    async fn create_index(&self, collection: &str, name: &str, fields: &[&str]) -> Result<()> {
        let mut keys = Document::new();
        for field in fields {
            keys.insert(field.to_string(), 1);
        }
        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build();
        self.db
            .collection::<Document>(collection)
            .create_index(model, None)
            .await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, docs: Vec<serde_json::Value>) -> Result<()> {
        let documents: Result<Vec<Document>> = docs.iter().map(Self::to_document).collect();
        self.db
            .collection::<Document>(collection)
            .insert_many(documents?, None)
            .await?;
        Ok(())
    }

    async fn count(&self, collection: &str, filter: serde_json::Value) -> Result<u64> {
        let filter = Self::to_document(&filter)?;
        Ok(self
            .db
            .collection::<Document>(collection)
            .count_documents(filter, None)
            .await?)
    }
}

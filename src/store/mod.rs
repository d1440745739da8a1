//! Store capability seams and the owned handle context.
//!
//! The drivers themselves are external; these traits are the surface the
//! pipeline is written against, and the adapters in this module are thin.

pub mod clickhouse;
pub mod connect;
pub mod mongo;
pub mod writer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AnalyticsConfig, DeploymentMode};
use crate::error::{GriddleError, Result};
use crate::schema::topology::EventTableTopology;

pub use clickhouse::HttpColumnarStore;
pub use connect::connect;
pub use mongo::MongoDocumentStore;
pub use writer::EventWriter;

/// Capability interface over the columnar analytical store.
#[async_trait]
pub trait ColumnarStore: Send + Sync {
    /// Execute a statement, discarding any result.
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Run a query and return its rows as JSON objects.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<serde_json::Value>>;

    async fn table_exists(&self, table: &str) -> Result<bool>;
}

/// Capability interface over the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn collection_names(&self) -> Result<Vec<String>>;

    async fn index_names(&self, collection: &str) -> Result<Vec<String>>;

    /// Create a named compound index, ascending on every listed field.
    async fn create_index(&self, collection: &str, name: &str, fields: &[&str]) -> Result<()>;

    async fn insert_many(&self, collection: &str, docs: Vec<serde_json::Value>) -> Result<()>;

    async fn count(&self, collection: &str, filter: serde_json::Value) -> Result<u64>;
}

/// Explicitly constructed context holding the owned store handles and the
/// derived topology. Built once at process start and passed by `Arc`;
/// there are no process-wide singletons behind it.
pub struct StoreContext {
    pub mode: DeploymentMode,
    pub topology: EventTableTopology,
    pub columnar: Option<Arc<dyn ColumnarStore>>,
    pub document: Option<Arc<dyn DocumentStore>>,
}

impl StoreContext {
    pub fn new(
        config: &AnalyticsConfig,
        topology: EventTableTopology,
        columnar: Option<Arc<dyn ColumnarStore>>,
        document: Option<Arc<dyn DocumentStore>>,
    ) -> Result<Self> {
        match config.mode {
            DeploymentMode::Clustered if columnar.is_none() => {
                return Err(GriddleError::Config(
                    "clustered mode requires a columnar store handle".to_string(),
                ));
            }
            DeploymentMode::Standalone if document.is_none() => {
                return Err(GriddleError::Config(
                    "standalone mode requires a document store handle".to_string(),
                ));
            }
            _ => {}
        }
        Ok(Self {
            mode: config.mode,
            topology,
            columnar,
            document,
        })
    }

    pub fn columnar(&self) -> Result<&Arc<dyn ColumnarStore>> {
        self.columnar
            .as_ref()
            .ok_or_else(|| GriddleError::Config("no columnar store configured".to_string()))
    }

    pub fn document(&self) -> Result<&Arc<dyn DocumentStore>> {
        self.document
            .as_ref()
            .ok_or_else(|| GriddleError::Config("no document store configured".to_string()))
    }
}

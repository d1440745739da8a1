use std::sync::Arc;

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::schema::topology;
use crate::store::{
    ColumnarStore, DocumentStore, HttpColumnarStore, MongoDocumentStore, StoreContext,
};

/// Connect the backends the deployment mode needs and derive the event
/// table topology. The document store is always connected (document
/// migrations are unconditional) while the columnar handle only exists
/// in clustered mode.
pub async fn connect(config: &AnalyticsConfig) -> Result<StoreContext> {
    let topology = topology::compile(config)?;

    let columnar: Option<Arc<dyn ColumnarStore>> = if config.mode.is_clustered() {
        Some(Arc::new(HttpColumnarStore::new(&config.columnar)?))
    } else {
        None
    };
    let document: Option<Arc<dyn DocumentStore>> =
        Some(Arc::new(MongoDocumentStore::connect(&config.document).await?));

    StoreContext::new(config, topology, columnar, document)
}

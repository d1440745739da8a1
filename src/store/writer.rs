use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::DeploymentMode;
use crate::error::{GriddleError, Result};
use crate::event::Event;
use crate::schema::sql::{bulk_insert_events_sql, optimize_events_sql};
use crate::store::{DocumentStore, StoreContext};

/// Name of the compound lookup index on the events collection.
pub const EVENT_COMPOUND_INDEX: &str = "event_env_id_distinct_id_timestamp";

/// Fields of the compound index, ascending on all of them.
pub const EVENT_INDEX_FIELDS: [&str; 4] = ["event", "env_id", "distinct_id", "timestamp"];

/// Routes event batches to the columnar store (clustered mode) or the
/// document store (standalone mode). The deployment mode is resolved once
/// at construction; exactly one physical write path is ever active.
pub struct EventWriter {
    context: Arc<StoreContext>,
    collection: String,
    index_ensured: OnceCell<()>,
}

impl EventWriter {
    pub fn new(context: Arc<StoreContext>, events_collection: &str) -> Self {
        Self {
            context,
            collection: events_collection.to_string(),
            index_ensured: OnceCell::new(),
        }
    }

    /// Write a batch of events. The whole batch is validated before any
    /// I/O; a malformed event rejects the batch with `WriteRejected`.
    pub async fn write(&self, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        for event in events {
            event.validate().map_err(GriddleError::WriteRejected)?;
        }

        match self.context.mode {
            DeploymentMode::Clustered => self.write_columnar(events).await,
            DeploymentMode::Standalone => self.write_documents(events).await,
        }
    }

    /// Explicitly merge the local event table (clustered mode only).
    pub async fn optimize(&self) -> Result<()> {
        let store = self.context.columnar()?;
        store
            .execute(&optimize_events_sql(&self.context.topology))
            .await
    }

    async fn write_columnar(&self, events: &[Event]) -> Result<()> {
        let store = self.context.columnar()?;
        let sql = bulk_insert_events_sql(&self.context.topology, events);
        store.execute(&sql).await?;
        tracing::debug!(
            count = events.len(),
            table = %self.context.topology.write_table,
            "wrote event batch to columnar store"
        );
        Ok(())
    }

    async fn write_documents(&self, events: &[Event]) -> Result<()> {
        let store = self.context.document()?;

        // First write ensures the compound index, exactly once per
        // process; concurrent first writes race safely on the cell.
        self.index_ensured
            .get_or_try_init(|| ensure_event_index(store.as_ref(), &self.collection))
            .await?;

        let docs: Result<Vec<serde_json::Value>> = events
            .iter()
            .map(|e| serde_json::to_value(e).map_err(GriddleError::from))
            .collect();
        store.insert_many(&self.collection, docs?).await?;
        tracing::debug!(
            count = events.len(),
            collection = %self.collection,
            "wrote event batch to document store"
        );
        Ok(())
    }
}

/// Idempotent: checked by presence before creation, never re-created.
async fn ensure_event_index(store: &dyn DocumentStore, collection: &str) -> Result<()> {
    let existing = store.index_names(collection).await?;
    if existing.iter().any(|name| name == EVENT_COMPOUND_INDEX) {
        return Ok(());
    }
    store
        .create_index(collection, EVENT_COMPOUND_INDEX, &EVENT_INDEX_FIELDS)
        .await?;
    tracing::info!(collection, index = EVENT_COMPOUND_INDEX, "created events compound index");
    Ok(())
}

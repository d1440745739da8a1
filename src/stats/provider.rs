use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DeploymentMode;
use crate::error::Result;
use crate::schema::sql::escape;
use crate::stats::{StatisticsProvider, StatisticsRequest};
use crate::store::StoreContext;

/// Built-in provider answering every query class with raw event counts
/// from the active backend. The statistical formulas live outside this
/// crate; this provider exercises the pipeline (read-table resolution,
/// caching, the response envelope) with the simplest real result.
pub struct EventCountProvider {
    context: Arc<StoreContext>,
    collection: String,
}

struct Window {
    env_id: String,
    event: Option<String>,
    start_ms: i64,
    end_ms: i64,
}

impl EventCountProvider {
    pub fn new(context: Arc<StoreContext>, events_collection: &str) -> Self {
        Self {
            context,
            collection: events_collection.to_string(),
        }
    }

    async fn count_columnar(&self, window: &Window) -> Result<serde_json::Value> {
        let store = self.context.columnar()?;
        let mut filters = vec![format!("env_id = '{}'", escape(&window.env_id))];
        if let Some(event) = &window.event {
            filters.push(format!("event = '{}'", escape(event)));
        }
        if window.start_ms > 0 {
            filters.push(format!("timestamp >= fromUnixTimestamp64Milli({})", window.start_ms));
        }
        if window.end_ms > 0 {
            filters.push(format!("timestamp <= fromUnixTimestamp64Milli({})", window.end_ms));
        }

        let sql = format!(
            "SELECT toDate(timestamp) AS day, count() AS events FROM {} WHERE {} GROUP BY day ORDER BY day",
            self.context.topology.read_table,
            filters.join(" AND "),
        );
        let rows = store.fetch_rows(&sql).await?;
        let total: u64 = rows
            .iter()
            .filter_map(|row| row.get("events").and_then(|v| v.as_u64()))
            .sum();
        Ok(serde_json::json!({ "intervals": rows, "totalEvents": total }))
    }

    async fn count_documents(&self, window: &Window) -> Result<serde_json::Value> {
        let store = self.context.document()?;
        let mut filter = serde_json::Map::new();
        filter.insert("env_id".to_string(), window.env_id.clone().into());
        if let Some(event) = &window.event {
            filter.insert("event".to_string(), event.clone().into());
        }
        let mut bounds = serde_json::Map::new();
        if window.start_ms > 0 {
            bounds.insert("$gte".to_string(), window.start_ms.into());
        }
        if window.end_ms > 0 {
            bounds.insert("$lte".to_string(), window.end_ms.into());
        }
        if !bounds.is_empty() {
            filter.insert("timestamp".to_string(), bounds.into());
        }

        let total = store
            .count(&self.collection, serde_json::Value::Object(filter))
            .await?;
        Ok(serde_json::json!({ "totalEvents": total }))
    }

    async fn count(&self, window: Window) -> Result<serde_json::Value> {
        match self.context.mode {
            DeploymentMode::Clustered => self.count_columnar(&window).await,
            DeploymentMode::Standalone => self.count_documents(&window).await,
        }
    }
}

#[async_trait]
impl StatisticsProvider for EventCountProvider {
    async fn compute(&self, request: &StatisticsRequest) -> Result<serde_json::Value> {
        match request {
            StatisticsRequest::FeatureFlagInterval(p) => {
                self.count(Window {
                    env_id: p.env_id.clone(),
                    event: Some("FlagValue".to_string()),
                    start_ms: p.start_time,
                    end_ms: p.end_time,
                })
                .await
            }
            StatisticsRequest::EndUserInterval(p) => {
                self.count(Window {
                    env_id: p.env_id.clone(),
                    event: None,
                    start_ms: p.start_time,
                    end_ms: p.end_time,
                })
                .await
            }
            StatisticsRequest::ExperimentResult(p) => {
                let mut result = self
                    .count(Window {
                        env_id: p.env_id.clone(),
                        event: Some(p.event_name.clone()).filter(|e| !e.is_empty()),
                        start_ms: p.start_expt_time,
                        end_ms: p.end_expt_time,
                    })
                    .await?;
                if let Some(obj) = result.as_object_mut() {
                    obj.insert("exptId".to_string(), p.expt_id.clone().into());
                }
                Ok(result)
            }
        }
    }
}

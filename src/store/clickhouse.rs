use std::time::Duration;

use async_trait::async_trait;

use crate::config::ColumnarConfig;
use crate::error::{GriddleError, Result};
use crate::store::ColumnarStore;

/// Columnar store adapter speaking the engine's HTTP interface.
///
/// Statements go over a pooled client with a bounded request timeout, so
/// connection acquisition never queues unboundedly under load.
pub struct HttpColumnarStore {
    client: reqwest::Client,
    url: String,
    database: String,
    user: String,
    password: String,
}

impl HttpColumnarStore {
    pub fn new(config: &ColumnarConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| GriddleError::Config(format!("columnar http client: {}", e)))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    async fn post_sql(&self, sql: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.url)
            .query(&[("database", self.database.as_str())])
            .header("X-ClickHouse-User", &self.user)
            .header("X-ClickHouse-Key", &self.password)
            .body(sql.to_string())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GriddleError::BackendUnavailable(format!(
                "columnar store returned {}: {}",
                status,
                body.trim()
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl ColumnarStore for HttpColumnarStore {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.post_sql(sql).await.map(|_| ())
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<serde_json::Value>> {
        let body = self.post_sql(&format!("{} FORMAT JSONEachRow", sql)).await?;
        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(GriddleError::from))
            .collect()
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let body = self.post_sql(&format!("EXISTS TABLE {}", table)).await?;
        Ok(body.trim() == "1")
    }
}

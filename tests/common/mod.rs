#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use griddle::config::AnalyticsConfig;
use griddle::error::{GriddleError, Result};
use griddle::event::Event;
use griddle::schema::topology;
use griddle::stats::{StatisticsProvider, StatisticsRequest};
use griddle::store::{ColumnarStore, DocumentStore, StoreContext};

/// In-memory columnar store double: records statements, tracks created
/// tables, serves canned rows.
pub struct MemoryColumnarStore {
    pub executed: Mutex<Vec<String>>,
    pub tables: Mutex<HashSet<String>>,
    pub rows: Mutex<Vec<serde_json::Value>>,
    pub fail_execute: AtomicBool,
}

impl MemoryColumnarStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            executed: Mutex::new(Vec::new()),
            tables: Mutex::new(HashSet::new()),
            rows: Mutex::new(Vec::new()),
            fail_execute: AtomicBool::new(false),
        })
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn created_table(sql: &str) -> Option<String> {
        sql.split("IF NOT EXISTS ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .map(|t| t.trim_end_matches('\n').to_string())
    }
}

#[async_trait]
impl ColumnarStore for MemoryColumnarStore {
    async fn execute(&self, sql: &str) -> Result<()> {
        if self.fail_execute.load(Ordering::SeqCst) {
            return Err(GriddleError::BackendUnavailable("injected failure".to_string()));
        }
        if let Some(table) = Self::created_table(sql) {
            self.tables.lock().unwrap().insert(table);
        }
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<serde_json::Value>> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.tables.lock().unwrap().contains(table))
    }
}

/// In-memory document store double.
pub struct MemoryDocumentStore {
    pub collections: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    pub indexes: Mutex<HashMap<String, Vec<String>>>,
    pub index_creates: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            collections: Mutex::new(HashMap::new()),
            indexes: Mutex::new(HashMap::new()),
            index_creates: AtomicUsize::new(0),
        })
    }

    pub fn docs(&self, collection: &str) -> Vec<serde_json::Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn collection_names(&self) -> Result<Vec<String>> {
        Ok(self.collections.lock().unwrap().keys().cloned().collect())
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self
            .indexes
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_index(&self, collection: &str, name: &str, _fields: &[&str]) -> Result<()> {
        self.index_creates.fetch_add(1, Ordering::SeqCst);
        self.indexes
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(name.to_string());
        Ok(())
    }

    async fn insert_many(&self, collection: &str, docs: Vec<serde_json::Value>) -> Result<()> {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
        Ok(())
    }

    async fn count(&self, collection: &str, filter: serde_json::Value) -> Result<u64> {
        let docs = self.docs(collection);
        let filter = filter.as_object().cloned().unwrap_or_default();
        let matched = docs
            .iter()
            .filter(|doc| {
                filter.iter().all(|(key, expected)| match expected {
                    serde_json::Value::Object(bounds) => {
                        let actual = doc.get(key).and_then(|v| v.as_i64()).unwrap_or(0);
                        bounds.iter().all(|(op, bound)| {
                            let bound = bound.as_i64().unwrap_or(0);
                            match op.as_str() {
                                "$gte" => actual >= bound,
                                "$lte" => actual <= bound,
                                _ => true,
                            }
                        })
                    }
                    other => doc.get(key) == Some(other),
                })
            })
            .count();
        Ok(matched as u64)
    }
}

/// Statistics capability double that counts invocations.
pub struct CountingProvider {
    pub calls: AtomicUsize,
    pub result: serde_json::Value,
    pub fail_next: AtomicBool,
}

impl CountingProvider {
    pub fn new(result: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result,
            fail_next: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatisticsProvider for CountingProvider {
    async fn compute(&self, _request: &StatisticsRequest) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GriddleError::Computation("injected failure".to_string()));
        }
        Ok(self.result.clone())
    }
}

pub fn make_event(env_id: &str, event: &str) -> Event {
    Event {
        uuid: uuid::Uuid::new_v4(),
        distinct_id: "user-1".to_string(),
        env_id: env_id.to_string(),
        event: event.to_string(),
        properties: serde_json::Map::new(),
        timestamp: 1_700_000_000_000,
    }
}

pub fn clustered_context(
    config: &AnalyticsConfig,
    columnar: Arc<MemoryColumnarStore>,
    document: Option<Arc<MemoryDocumentStore>>,
) -> Arc<StoreContext> {
    let topo = topology::compile(config).unwrap();
    Arc::new(
        StoreContext::new(
            config,
            topo,
            Some(columnar as Arc<dyn ColumnarStore>),
            document.map(|d| d as Arc<dyn DocumentStore>),
        )
        .unwrap(),
    )
}

pub fn standalone_context(
    config: &AnalyticsConfig,
    document: Arc<MemoryDocumentStore>,
) -> Arc<StoreContext> {
    let topo = topology::compile(config).unwrap();
    Arc::new(
        StoreContext::new(config, topo, None, Some(document as Arc<dyn DocumentStore>)).unwrap(),
    )
}

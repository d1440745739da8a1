use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single behavioral event (feature-flag evaluation or end-user action).
///
/// `uuid` is the idempotency key: the columnar table is a replacing
/// merge-tree, so re-writing the same event never yields two rows on the
/// standard read path. Events are immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub uuid: Uuid,
    #[serde(default)]
    pub distinct_id: String,
    #[serde(default)]
    pub env_id: String,
    pub event: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Event time, epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl Event {
    /// Validate the fields the storage layer depends on. Malformed events
    /// reject the whole batch before any I/O happens.
    pub fn validate(&self) -> Result<(), String> {
        if self.uuid.is_nil() {
            return Err("event uuid must be set".to_string());
        }
        if self.env_id.is_empty() {
            return Err("event env_id must be set".to_string());
        }
        if self.timestamp <= 0 {
            return Err("event timestamp must be a positive epoch-millisecond value".to_string());
        }
        Ok(())
    }
}

use std::sync::Arc;

use griddle::stats::{EventCountProvider, StatisticsProvider};
use griddle::{AnalyticsConfig, EventWriter, StatsCache, StoreContext};

pub mod events;
pub mod experiments;
pub mod health;

pub use events::{create_events, get_event_stat};
pub use experiments::get_expt_results;
pub use health::{liveness, readiness};

pub struct AppState {
    pub context: Arc<StoreContext>,
    pub writer: EventWriter,
    pub cache: StatsCache,
    pub provider: Arc<dyn StatisticsProvider>,
}

impl AppState {
    pub fn new(config: &AnalyticsConfig, context: Arc<StoreContext>) -> Self {
        let collection = &config.document.events_collection;
        Self {
            writer: EventWriter::new(Arc::clone(&context), collection),
            provider: Arc::new(EventCountProvider::new(Arc::clone(&context), collection)),
            cache: StatsCache::new(),
            context,
        }
    }

    /// Swap the statistics capability (tests plug in counters here).
    pub fn with_provider(mut self, provider: Arc<dyn StatisticsProvider>) -> Self {
        self.provider = provider;
        self
    }
}

/// The `{code, error, data}` envelope every endpoint answers with.
pub(crate) fn envelope_ok(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "code": 200, "error": "", "data": data })
}

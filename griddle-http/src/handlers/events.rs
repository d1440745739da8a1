use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use griddle::{Event, GriddleError, QueryClass, StatisticsRequest};

use super::{envelope_ok, AppState};

/// POST /api/events: ingest a JSON array of events.
pub async fn create_events(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, GriddleError> {
    if body.is_empty() {
        return Err(GriddleError::WriteRejected("post body is empty".to_string()));
    }
    let events: Vec<Event> = serde_json::from_slice(&body)
        .map_err(|e| GriddleError::WriteRejected(format!("malformed event payload: {}", e)))?;
    state.writer.write(&events).await?;
    Ok(Json(envelope_ok(serde_json::json!({}))))
}

/// POST /api/events/stat/:event_class: interval statistics, answered
/// from the cache when a fresh entry exists for the exact payload bytes.
pub async fn get_event_stat(
    State(state): State<Arc<AppState>>,
    Path(event_class): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, GriddleError> {
    if body.is_empty() {
        return Err(GriddleError::Json("post body is empty".to_string()));
    }
    let class = QueryClass::from_event_class(&event_class)?;
    stat_response(&state, class, &body).await
}

pub(crate) async fn stat_response(
    state: &AppState,
    class: QueryClass,
    body: &[u8],
) -> Result<Json<serde_json::Value>, GriddleError> {
    let request = StatisticsRequest::decode(class, body)?;
    let provider = Arc::clone(&state.provider);
    let data = state
        .cache
        .get_or_compute(body, class.ttl(), move || async move {
            provider.compute(&request).await
        })
        .await?;
    // Piggyback slot eviction on request traffic; there is no
    // background sweeper.
    state.cache.evict_expired();
    Ok(Json(envelope_ok(data)))
}

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use griddle::{GriddleError, QueryClass};

use super::events::stat_response;
use super::AppState;

/// POST /api/expt/results: experiment analysis, cached for 10 seconds
/// per distinct payload.
pub async fn get_expt_results(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, GriddleError> {
    if body.is_empty() {
        return Err(GriddleError::Json("post body is empty".to_string()));
    }
    stat_response(&state, QueryClass::ExperimentResult, &body).await
}

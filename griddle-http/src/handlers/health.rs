use axum::Json;

pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "state": "OK" }))
}

pub async fn readiness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "state": "OK" }))
}

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use griddle::AnalyticsConfig;

use crate::handlers::{
    create_events, get_event_stat, get_expt_results, liveness, readiness, AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/api/events", post(create_events))
        .route("/api/events/stat/:event_class", post(get_event_stat))
        .route("/api/expt/results", post(get_expt_results))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AnalyticsConfig::from_env();
    tracing::info!(
        mode = ?config.mode,
        replication = config.columnar.replication,
        "starting analytics server"
    );

    let context = Arc::new(griddle::store::connect(&config).await?);
    let state = Arc::new(AppState::new(&config, context));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

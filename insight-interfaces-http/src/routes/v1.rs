use axum::Router;

use insight_application::AppState;

use crate::handlers::{
    alert_handlers, analysis_handlers, event_handlers, ingest_handlers, ops_handlers,
    stats_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/analyze",
            axum::routing::get(analysis_handlers::analyze),
        )
        .route(
            "/v1/patterns",
            axum::routing::get(analysis_handlers::patterns),
        )
        .route("/v1/stats", axum::routing::get(stats_handlers::stats))
        .route(
            "/v1/alerts",
            axum::routing::get(alert_handlers::alerts),
        )
        .route(
            "/v1/alerts/generate",
            axum::routing::post(alert_handlers::trigger_alerts),
        )
        .route(
            "/v1/ingest",
            axum::routing::post(ingest_handlers::ingest),
        )
        .route(
            "/v1/outcomes",
            axum::routing::post(ingest_handlers::submit_outcome),
        )
        .route(
            "/v1/events/ws",
            axum::routing::get(event_handlers::events_ws),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}

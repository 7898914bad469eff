use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use insight_application::AppState;
use insight_domain::ServiceStatus;

use crate::middleware::authorize;

#[derive(Debug, Serialize)]
struct ReadyReport {
    status: &'static str,
    database: ServiceStatus,
    cache: ServiceStatus,
    subscribers: usize,
}

fn timed_out(latency_ms: u64) -> ServiceStatus {
    ServiceStatus {
        status: "timeout".to_string(),
        latency_ms,
    }
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Ready while the database answers; a disabled cache is fine, a broken one is not.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    let budget_ms = timeout_secs * 1000;

    let database = match timeout(timeout_duration, state.health.check_database()).await {
        Ok(status) => status,
        Err(_) => {
            error!("database ready check timeout after {}s", timeout_secs);
            timed_out(budget_ms)
        }
    };
    let cache = match timeout(timeout_duration, state.health.check_cache()).await {
        Ok(status) => status,
        Err(_) => {
            error!("cache ready check timeout after {}s", timeout_secs);
            timed_out(budget_ms)
        }
    };

    let ready = database.is_ok() && (cache.is_ok() || cache.status == "disabled");
    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let report = ReadyReport {
        status: if ready { "ok" } else { "degraded" },
        database,
        cache,
        subscribers: state.events.subscriber_count(),
    };
    (code, Json(report))
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use insight_application::commands::generate_alerts;
use insight_application::queries::list_alerts;
use insight_application::AppState;
use insight_domain::{Alert, UserId};

use crate::error::HttpError;
use crate::handlers::{DataResponse, MessageResponse};
use crate::middleware::authorize;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateAlertsRequest {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

pub async fn alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<DataResponse<Vec<Alert>>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let alerts = list_alerts(&state, query.user_id.as_deref()).await?;
    Ok(Json(DataResponse::new(alerts)))
}

/// Runs the alert rules synchronously so the caller learns how many alerts were stored.
pub async fn trigger_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<GenerateAlertsRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let user = UserId::parse(payload.user_id.as_deref())
        .ok_or_else(|| HttpError::BadRequest("userId is required".to_string()))?;
    let generated = generate_alerts(&state, user.as_str()).await;
    Ok(Json(MessageResponse {
        generated: Some(generated.len()),
        ..MessageResponse::ok("Alert generation completed")
    }))
}

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::warn;

use insight_application::commands::{process_ingest, record_outcome, IngestRequest};
use insight_application::AppState;
use insight_domain::{GameOutcome, NewOutcome};

use crate::error::HttpError;
use crate::handlers::{DataResponse, MessageResponse};
use crate::middleware::{authorize, parse_json_body};

pub async fn ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let request: IngestRequest = parse_json_body(&headers, &body).map_err(|err| {
        warn!("failed to parse ingest body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    process_ingest(&state, request).await?;
    Ok(Json(MessageResponse::ok("Game data processed")))
}

pub async fn submit_outcome(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<DataResponse<GameOutcome>>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let new_outcome: NewOutcome = parse_json_body(&headers, &body).map_err(|err| {
        warn!("failed to parse outcome body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let outcome = record_outcome(&state, new_outcome).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(outcome))))
}

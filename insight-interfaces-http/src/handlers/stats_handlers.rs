use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use insight_application::queries::game_stats;
use insight_application::AppState;
use insight_domain::GameStats;

use crate::error::HttpError;
use crate::handlers::DataResponse;
use crate::middleware::authorize;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub game: Option<String>,
    pub hours: Option<u32>,
}

pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DataResponse<GameStats>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let (stats, cached) = game_stats(&state, query.game.as_deref(), query.hours).await?;
    Ok(Json(DataResponse::new(stats).cached(cached)))
}

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use insight_application::queries::{analyze_for_client, list_patterns};
use insight_application::AppState;
use insight_domain::{GameInsight, PatternView};

use crate::error::HttpError;
use crate::handlers::DataResponse;
use crate::middleware::{authorize, client_identifier};

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub game: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    pub game: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<DataResponse<GameInsight>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let client = client_identifier(&headers, peer.map(|ConnectInfo(addr)| addr));
    let insight = analyze_for_client(
        &state,
        query.game.as_deref(),
        query.user_id.as_deref(),
        client.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse::new(insight).stamped()))
}

pub async fn patterns(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GameQuery>,
) -> Result<Json<Vec<PatternView>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let views = list_patterns(&state, query.game.as_deref()).await?;
    Ok(Json(views))
}

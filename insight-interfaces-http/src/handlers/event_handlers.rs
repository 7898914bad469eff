use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use insight_application::AppState;
use insight_domain::{GameType, InsightEvent};

use crate::middleware::authorize_with_query;

#[derive(Debug, Deserialize)]
pub struct EventStreamQuery {
    pub game: Option<String>,
    pub token: Option<String>,
}

pub async fn events_ws(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventStreamQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    if !authorize_with_query(&state.config, &headers, query.token.as_deref()) {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }
    let game = query
        .game
        .as_deref()
        .map(GameType::from)
        .filter(|game| !game.as_str().is_empty());
    ws.on_upgrade(move |socket| stream_events(socket, state, game))
        .into_response()
}

fn wants(game: &Option<GameType>, event: &InsightEvent) -> bool {
    match game {
        Some(game) => game.as_str() == event.game_type,
        None => true,
    }
}

async fn stream_events(socket: WebSocket, state: AppState, game: Option<GameType>) {
    let mut rx = state.events.subscribe();
    let (mut sender, mut receiver) = socket.split();
    debug!(game = ?game, "event subscriber connected");

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
            event = rx.recv() => match event {
                Ok(event) => {
                    if !wants(&game, &event) {
                        continue;
                    }
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!("failed to encode event: {}", err);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    debug!("event subscriber disconnected");
}

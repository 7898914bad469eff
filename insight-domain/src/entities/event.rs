// Live event entity
// Broadcast to websocket subscribers; never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightEventKind {
    GameUpdate,
    TurboAlert,
    PatternDetected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightEvent {
    pub event: InsightEventKind,
    pub game_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

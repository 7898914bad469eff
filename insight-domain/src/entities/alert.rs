// Alert entity
// User-facing notice created by the alert rules; only `is_read` changes after creation.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Game type used for alerts that are not tied to one game.
pub const GENERAL_GAME: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LossStreak,
    HighBet,
    Opportunity,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LossStreak => "loss_streak",
            AlertType::HighBet => "high_bet",
            AlertType::Opportunity => "opportunity",
        }
    }
}

impl FromStr for AlertType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "loss_streak" => Ok(AlertType::LossStreak),
            "high_bet" => Ok(AlertType::HighBet),
            "opportunity" => Ok(AlertType::Opportunity),
            other => Err(anyhow::anyhow!("unknown alert type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub alert_type: AlertType,
    pub game_type: String,
    pub message: String,
    pub payload: Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub user_id: String,
    pub alert_type: AlertType,
    pub game_type: String,
    pub message: String,
    pub payload: Value,
}

impl NewAlert {
    pub fn into_alert(self, id: String, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id,
            user_id: self.user_id,
            alert_type: self.alert_type,
            game_type: self.game_type,
            message: self.message,
            payload: self.payload,
            is_read: false,
            created_at,
        }
    }
}

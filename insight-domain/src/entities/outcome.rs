// Game outcome entity
// Immutable record of one finished round, written by gameplay and never mutated

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::utils::round_to;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub id: String,
    pub user_id: Option<String>,
    pub game_type: String,
    pub bet_amount: f64,
    pub result_amount: f64,
    pub multiplier: f64,
    #[serde(default)]
    pub game_data: Value,
    pub created_at: DateTime<Utc>,
}

impl GameOutcome {
    pub fn is_win(&self) -> bool {
        self.result_amount > self.bet_amount
    }

    pub fn is_loss(&self) -> bool {
        !self.is_win()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOutcome {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(alias = "gameType")]
    pub game_type: String,
    #[serde(alias = "betAmount")]
    pub bet_amount: f64,
    #[serde(alias = "resultAmount")]
    pub result_amount: f64,
    pub multiplier: f64,
    #[serde(default, alias = "gameData")]
    pub game_data: Value,
}

#[derive(Debug, Error, PartialEq)]
pub enum OutcomeError {
    #[error("game_type is required")]
    MissingGameType,
    #[error("{0} must be a finite, non-negative number")]
    InvalidAmount(&'static str),
}

impl NewOutcome {
    pub fn validate(&self) -> Result<(), OutcomeError> {
        if self.game_type.trim().is_empty() {
            return Err(OutcomeError::MissingGameType);
        }
        for (name, value) in [
            ("bet_amount", self.bet_amount),
            ("result_amount", self.result_amount),
            ("multiplier", self.multiplier),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(OutcomeError::InvalidAmount(name));
            }
        }
        Ok(())
    }

    pub fn into_outcome(self, id: String, created_at: DateTime<Utc>) -> GameOutcome {
        GameOutcome {
            id,
            user_id: self
                .user_id
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            game_type: self.game_type.trim().to_lowercase(),
            bet_amount: self.bet_amount,
            result_amount: self.result_amount,
            multiplier: self.multiplier,
            game_data: self.game_data,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeFilter {
    pub user_id: Option<String>,
    pub game_type: Option<String>,
}

impl OutcomeFilter {
    pub fn for_game(game_type: &str) -> Self {
        Self {
            user_id: None,
            game_type: Some(game_type.to_string()),
        }
    }

    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            game_type: None,
        }
    }

    pub fn with_game(mut self, game_type: &str) -> Self {
        self.game_type = Some(game_type.to_string());
        self
    }

    pub fn matches(&self, outcome: &GameOutcome) -> bool {
        let user_ok = match &self.user_id {
            Some(user) => outcome.user_id.as_deref() == Some(user.as_str()),
            None => true,
        };
        let game_ok = match &self.game_type {
            Some(game) => outcome.game_type == *game,
            None => true,
        };
        user_ok && game_ok
    }
}

/// Raw aggregates over a trailing window, as returned by the history store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStats {
    pub total_games: u64,
    pub avg_multiplier: f64,
    pub max_multiplier: f64,
    pub min_multiplier: f64,
    pub avg_bet: f64,
    pub wins: u64,
    pub losses: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub game_type: String,
    pub hours: u32,
    pub total_games: u64,
    pub avg_multiplier: f64,
    pub max_multiplier: f64,
    pub min_multiplier: f64,
    pub avg_bet: f64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
    pub loss_rate: f64,
}

impl GameStats {
    pub fn from_stats(game_type: &str, hours: u32, stats: OutcomeStats) -> Self {
        let win_rate = if stats.total_games > 0 {
            round_to(stats.wins as f64 / stats.total_games as f64 * 100.0, 1)
        } else {
            0.0
        };
        Self {
            game_type: game_type.to_string(),
            hours,
            total_games: stats.total_games,
            avg_multiplier: round_to(stats.avg_multiplier, 2),
            max_multiplier: round_to(stats.max_multiplier, 2),
            min_multiplier: round_to(stats.min_multiplier, 2),
            avg_bet: round_to(stats.avg_bet, 0),
            wins: stats.wins,
            losses: stats.losses,
            win_rate,
            loss_rate: round_to(100.0 - win_rate, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_outcome(bet: f64, result: f64) -> NewOutcome {
        NewOutcome {
            user_id: Some(" u-1 ".to_string()),
            game_type: " Aviator ".to_string(),
            bet_amount: bet,
            result_amount: result,
            multiplier: 1.0,
            game_data: json!({}),
        }
    }

    #[test]
    fn win_requires_result_strictly_above_bet() {
        let outcome = new_outcome(10.0, 10.0).into_outcome("a".to_string(), Utc::now());
        assert!(outcome.is_loss());
        let outcome = new_outcome(10.0, 10.5).into_outcome("b".to_string(), Utc::now());
        assert!(outcome.is_win());
    }

    #[test]
    fn into_outcome_normalizes_keys() {
        let outcome = new_outcome(1.0, 2.0).into_outcome("a".to_string(), Utc::now());
        assert_eq!(outcome.game_type, "aviator");
        assert_eq!(outcome.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn validate_rejects_negative_and_non_finite_amounts() {
        assert_eq!(
            new_outcome(-1.0, 0.0).validate(),
            Err(OutcomeError::InvalidAmount("bet_amount"))
        );
        assert_eq!(
            new_outcome(1.0, f64::INFINITY).validate(),
            Err(OutcomeError::InvalidAmount("result_amount"))
        );
        let mut missing = new_outcome(1.0, 1.0);
        missing.game_type = " ".to_string();
        assert_eq!(missing.validate(), Err(OutcomeError::MissingGameType));
    }

    #[test]
    fn game_stats_derive_rates() {
        let stats = OutcomeStats {
            total_games: 3,
            avg_multiplier: 2.3456,
            max_multiplier: 5.0,
            min_multiplier: 1.0,
            avg_bet: 12.6,
            wins: 2,
            losses: 1,
        };
        let derived = GameStats::from_stats("aviator", 24, stats);
        assert_eq!(derived.win_rate, 66.7);
        assert_eq!(derived.loss_rate, 33.3);
        assert_eq!(derived.avg_multiplier, 2.35);
        assert_eq!(derived.avg_bet, 13.0);
    }

    #[test]
    fn game_stats_without_games_report_full_loss_rate() {
        let derived = GameStats::from_stats("mines", 1, OutcomeStats::default());
        assert_eq!(derived.win_rate, 0.0);
        assert_eq!(derived.loss_rate, 100.0);
    }
}

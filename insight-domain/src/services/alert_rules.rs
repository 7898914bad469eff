// Alert rules
// Pure evaluation over a user's recent outcomes; persistence is the caller's concern.

use serde::Deserialize;
use serde_json::json;

use crate::entities::{AlertType, GameInsight, GameOutcome, NewAlert, GENERAL_GAME};
use crate::utils::mean;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertRuleConfig {
    /// Outcomes loaded per evaluation.
    pub history_limit: usize,
    /// Most-recent outcomes inspected by the streak and bet rules.
    pub recent_window: usize,
    pub loss_streak_threshold: usize,
    pub high_bet_ratio: f64,
    pub opportunity_confidence: f64,
    pub tracked_games: Vec<String>,
}

impl Default for AlertRuleConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            recent_window: 5,
            loss_streak_threshold: 4,
            high_bet_ratio: 3.0,
            opportunity_confidence: 75.0,
            tracked_games: vec![
                "aviator".to_string(),
                "mines".to_string(),
                "roulette".to_string(),
            ],
        }
    }
}

/// `history` is most-recent-first.
pub fn loss_streak_alert(
    user_id: &str,
    history: &[GameOutcome],
    config: &AlertRuleConfig,
) -> Option<NewAlert> {
    let losses = history
        .iter()
        .take(config.recent_window)
        .filter(|outcome| outcome.is_loss())
        .count();
    if losses < config.loss_streak_threshold.max(1) {
        return None;
    }
    Some(NewAlert {
        user_id: user_id.to_string(),
        alert_type: AlertType::LossStreak,
        game_type: GENERAL_GAME.to_string(),
        message: "Loss streak detected. Consider taking a break or lowering your stakes."
            .to_string(),
        payload: json!({ "consecutive_losses": losses }),
    })
}

/// `history` is most-recent-first.
pub fn high_bet_alert(
    user_id: &str,
    history: &[GameOutcome],
    config: &AlertRuleConfig,
) -> Option<NewAlert> {
    let recent: Vec<&GameOutcome> = history.iter().take(config.recent_window).collect();
    let latest = recent.first()?;
    let bets: Vec<f64> = recent.iter().map(|outcome| outcome.bet_amount).collect();
    let average_bet = mean(&bets)?;
    if latest.bet_amount <= average_bet * config.high_bet_ratio {
        return None;
    }
    Some(NewAlert {
        user_id: user_id.to_string(),
        alert_type: AlertType::HighBet,
        game_type: latest.game_type.clone(),
        message: "Bet well above your recent average. Manage your bankroll carefully."
            .to_string(),
        payload: json!({
            "bet_amount": latest.bet_amount,
            "average_bet": average_bet,
        }),
    })
}

pub fn opportunity_alert(
    user_id: &str,
    insight: &GameInsight,
    config: &AlertRuleConfig,
) -> Option<NewAlert> {
    if insight.confidence_score <= config.opportunity_confidence {
        return None;
    }
    Some(NewAlert {
        user_id: user_id.to_string(),
        alert_type: AlertType::Opportunity,
        game_type: insight.game_type.clone(),
        message: format!(
            "Opportunity detected in {}! Confidence: {:.1}%",
            insight.game_type, insight.confidence_score
        ),
        payload: json!({ "analysis": insight.top_prediction() }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PredictionResult;
    use crate::value_objects::RiskLevel;
    use chrono::Utc;

    fn outcome(bet: f64, result: f64) -> GameOutcome {
        GameOutcome {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: Some("u1".to_string()),
            game_type: "aviator".to_string(),
            bet_amount: bet,
            result_amount: result,
            multiplier: 1.0,
            game_data: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    fn loss() -> GameOutcome {
        outcome(10.0, 0.0)
    }

    fn win() -> GameOutcome {
        outcome(10.0, 25.0)
    }

    #[test]
    fn four_losses_in_last_five_trigger_loss_streak() {
        let history = vec![loss(), loss(), loss(), loss(), win()];
        let alert = loss_streak_alert("u1", &history, &AlertRuleConfig::default())
            .expect("loss streak");
        assert_eq!(alert.alert_type, AlertType::LossStreak);
        assert_eq!(alert.game_type, GENERAL_GAME);
        assert_eq!(alert.payload["consecutive_losses"], 4);
    }

    #[test]
    fn winning_run_has_no_loss_streak() {
        let history = vec![win(), win(), win(), win(), win()];
        assert!(loss_streak_alert("u1", &history, &AlertRuleConfig::default()).is_none());
    }

    #[test]
    fn only_the_last_five_outcomes_count() {
        let history = vec![win(), win(), loss(), loss(), loss(), loss(), loss()];
        assert!(loss_streak_alert("u1", &history, &AlertRuleConfig::default()).is_none());
    }

    #[test]
    fn bet_above_three_times_average_is_flagged() {
        // average over last five = (100 + 0 * 4) / 5 = 20
        let history = vec![
            outcome(100.0, 0.0),
            outcome(0.0, 0.0),
            outcome(0.0, 0.0),
            outcome(0.0, 0.0),
            outcome(0.0, 0.0),
        ];
        let alert =
            high_bet_alert("u1", &history, &AlertRuleConfig::default()).expect("high bet");
        assert_eq!(alert.alert_type, AlertType::HighBet);
        assert_eq!(alert.payload["average_bet"], 20.0);
        assert_eq!(alert.game_type, "aviator");
    }

    #[test]
    fn moderate_bet_is_not_flagged() {
        // average = (30 + 17.5 * 4) / 5 = 20
        let mut history = vec![outcome(30.0, 0.0)];
        history.extend((0..4).map(|_| outcome(17.5, 0.0)));
        assert!(high_bet_alert("u1", &history, &AlertRuleConfig::default()).is_none());
    }

    #[test]
    fn empty_history_raises_nothing() {
        let config = AlertRuleConfig::default();
        assert!(loss_streak_alert("u1", &[], &config).is_none());
        assert!(high_bet_alert("u1", &[], &config).is_none());
    }

    #[test]
    fn opportunity_requires_confidence_above_threshold() {
        let config = AlertRuleConfig::default();
        let strong = PredictionResult::new(2.0, 95.0, &["x"], "go", RiskLevel::Low);
        let insight = GameInsight::assemble("mines", vec![], vec![strong], vec![], vec![]);
        let alert = opportunity_alert("u1", &insight, &config).expect("opportunity");
        assert_eq!(alert.game_type, "mines");
        assert_eq!(alert.payload["analysis"]["confidence"], 95.0);

        let exact = PredictionResult::new(2.0, 75.0, &["x"], "go", RiskLevel::Low);
        let insight = GameInsight::assemble("mines", vec![], vec![exact], vec![], vec![]);
        assert!(opportunity_alert("u1", &insight, &config).is_none());
    }
}

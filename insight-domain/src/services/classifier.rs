// Per-game regime classifiers
// Each classifier maps rolling aggregates over recent outcomes to one of a few fixed regimes.
// Thresholds come from configuration and are calibration constants, not derived values.

use serde::Deserialize;
use serde_json::Value;

use crate::entities::{GameOutcome, PredictionResult};
use crate::utils::{mean, round_to};
use crate::value_objects::{GameType, RiskLevel};

const ROULETTE_RED_NUMBERS: [u64; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];
const MINES_RECOMMENDED_POSITIONS: [u8; 6] = [1, 5, 9, 13, 17, 21];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierTuning {
    pub aviator: AviatorTuning,
    pub mines: MinesTuning,
    pub roulette: RouletteTuning,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AviatorTuning {
    pub lookback: usize,
    pub min_samples: usize,
    pub recent_window: usize,
    pub low_cutoff: f64,
    pub high_cutoff: f64,
    pub low_run_threshold: usize,
    pub high_run_threshold: usize,
    pub trend_ratio: f64,
    pub reversion_factor: f64,
    pub reversion_cap: f64,
    pub correction_factor: f64,
    pub correction_floor: f64,
}

impl Default for AviatorTuning {
    fn default() -> Self {
        Self {
            lookback: 50,
            min_samples: 10,
            recent_window: 10,
            low_cutoff: 2.0,
            high_cutoff: 5.0,
            low_run_threshold: 7,
            high_run_threshold: 3,
            trend_ratio: 1.2,
            reversion_factor: 1.3,
            reversion_cap: 3.0,
            correction_factor: 0.7,
            correction_floor: 1.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MinesTuning {
    pub lookback: usize,
    pub min_samples: usize,
    pub confidence_bonus: f64,
    pub confidence_cap: f64,
    pub strong_win_rate: f64,
    pub weak_win_rate: f64,
    pub strong_bonus: f64,
}

impl Default for MinesTuning {
    fn default() -> Self {
        Self {
            lookback: 30,
            min_samples: 5,
            confidence_bonus: 20.0,
            confidence_cap: 85.0,
            strong_win_rate: 0.7,
            weak_win_rate: 0.3,
            strong_bonus: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouletteTuning {
    pub lookback: usize,
    pub min_samples: usize,
    pub recent_window: usize,
    pub streak_threshold: usize,
}

impl Default for RouletteTuning {
    fn default() -> Self {
        Self {
            lookback: 20,
            min_samples: 5,
            recent_window: 10,
            streak_threshold: 7,
        }
    }
}

/// Classifier output plus the human-readable notes that go into a `GameInsight`.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub prediction: PredictionResult,
    pub insights: Vec<String>,
    pub alerts: Vec<String>,
}

/// Runs the classifier for `game` over `history` (most-recent-first, any game types).
pub fn classify(
    game: &GameType,
    history: &[GameOutcome],
    tuning: &ClassifierTuning,
) -> Classification {
    let games: Vec<GameOutcome> = history
        .iter()
        .filter(|outcome| outcome.game_type == game.as_str())
        .cloned()
        .collect();

    match game {
        GameType::Aviator => {
            let prediction = classify_aviator(&games, &tuning.aviator);
            let recent: Vec<f64> = games
                .iter()
                .take(tuning.aviator.recent_window)
                .map(|outcome| outcome.multiplier)
                .collect();
            let avg_multiplier = mean(&recent).unwrap_or(1.5);
            let win_rate = if games.is_empty() {
                50.0
            } else {
                games.iter().filter(|outcome| outcome.is_win()).count() as f64
                    / games.len() as f64
                    * 100.0
            };
            let mut alerts = Vec::new();
            if prediction.risk_level == RiskLevel::High {
                alerts.push("High risk detected - consider smaller bets".to_string());
            }
            Classification {
                prediction,
                insights: vec![
                    format!("Recent average multiplier: {:.2}x", avg_multiplier),
                    format!("Win rate: {:.1}%", win_rate),
                ],
                alerts,
            }
        }
        GameType::Mines => {
            let prediction = classify_mines(&games, &tuning.mines);
            let strategy = if prediction.risk_level == RiskLevel::Low {
                "Aggressive"
            } else {
                "Conservative"
            };
            Classification {
                prediction,
                insights: vec![
                    "Safe-position analysis based on historical data".to_string(),
                    format!("Recommended strategy: {}", strategy),
                ],
                alerts: Vec::new(),
            }
        }
        GameType::Roulette => Classification {
            prediction: classify_roulette(&games, &tuning.roulette),
            insights: vec![
                "Color and number trend analysis".to_string(),
                "Based on statistical probabilities".to_string(),
            ],
            alerts: Vec::new(),
        },
        GameType::Other(_) => Classification {
            prediction: classify_generic(),
            insights: vec![
                "Basic analysis available".to_string(),
                "More detailed analysis coming soon".to_string(),
            ],
            alerts: Vec::new(),
        },
    }
}

pub fn classify_aviator(history: &[GameOutcome], tuning: &AviatorTuning) -> PredictionResult {
    let multipliers: Vec<f64> = history
        .iter()
        .take(tuning.lookback)
        .map(|outcome| outcome.multiplier)
        .collect();
    if multipliers.len() < tuning.min_samples.max(1) {
        return PredictionResult::insufficient_data(
            1.5,
            30.0,
            "Wait for more rounds before relying on this analysis",
        );
    }

    let recent = &multipliers[..tuning.recent_window.clamp(1, multipliers.len())];
    let avg_recent = mean(recent).unwrap_or_default();
    let avg_overall = mean(&multipliers).unwrap_or_default();
    let low_count = recent.iter().filter(|m| **m < tuning.low_cutoff).count();
    let high_count = recent.iter().filter(|m| **m > tuning.high_cutoff).count();

    if low_count >= tuning.low_run_threshold {
        PredictionResult::new(
            round_to((avg_overall * tuning.reversion_factor).min(tuning.reversion_cap), 2),
            75.0,
            &["sequence_of_low_multipliers", "reversion_probability"],
            "Possible reversion toward higher multipliers",
            RiskLevel::Low,
        )
    } else if high_count >= tuning.high_run_threshold {
        PredictionResult::new(
            round_to((avg_overall * tuning.correction_factor).max(tuning.correction_floor), 2),
            65.0,
            &["recent_high_multipliers", "correction_expected"],
            "Caution: a downward correction is likely",
            RiskLevel::High,
        )
    } else if avg_recent > avg_overall * tuning.trend_ratio {
        PredictionResult::new(
            round_to(avg_overall, 2),
            60.0,
            &["above_average_trend", "normalization"],
            "Trend is normalizing toward the long-run average",
            RiskLevel::Medium,
        )
    } else {
        PredictionResult::new(
            round_to(avg_overall, 2),
            50.0,
            &["stable_distribution"],
            "No strong pattern; keep stakes steady",
            RiskLevel::Medium,
        )
    }
}

pub fn classify_mines(history: &[GameOutcome], tuning: &MinesTuning) -> PredictionResult {
    let games: Vec<&GameOutcome> = history.iter().take(tuning.lookback).collect();
    if games.len() < tuning.min_samples.max(1) {
        return PredictionResult::insufficient_data(
            "Central positions (6, 7, 8, 11, 12, 13)",
            40.0,
            "Start with a conservative strategy",
        );
    }

    let wins = games.iter().filter(|outcome| outcome.is_win()).count();
    let win_rate = wins as f64 / games.len() as f64;
    let mut confidence = (win_rate * 100.0 + tuning.confidence_bonus).min(tuning.confidence_cap);
    let (risk_level, recommendation) = if win_rate > tuning.strong_win_rate {
        confidence += tuning.strong_bonus;
        (RiskLevel::Low, "High success-rate pattern detected")
    } else if win_rate < tuning.weak_win_rate {
        (RiskLevel::High, "Caution: low recent success rate")
    } else {
        (
            RiskLevel::Medium,
            "Positions recommended from statistical analysis",
        )
    };

    let positions = MINES_RECOMMENDED_POSITIONS
        .iter()
        .map(|position| position.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    PredictionResult::new(
        format!("Positions: {}", positions),
        confidence,
        &["position_analysis", "historical_success_rate"],
        recommendation,
        risk_level,
    )
}

pub fn classify_roulette(history: &[GameOutcome], tuning: &RouletteTuning) -> PredictionResult {
    let games: Vec<&GameOutcome> = history.iter().take(tuning.lookback).collect();
    if games.len() < tuning.min_samples.max(1) {
        return PredictionResult::insufficient_data(
            "Red/Black with equal probability",
            35.0,
            "Stick to even-money bets",
        );
    }

    let recent: Vec<u64> = games
        .iter()
        .filter_map(|outcome| roulette_number(&outcome.game_data))
        .take(tuning.recent_window)
        .collect();
    let red_count = recent
        .iter()
        .filter(|n| ROULETTE_RED_NUMBERS.contains(n))
        .count();
    let black_count = recent
        .iter()
        .filter(|n| **n != 0 && !ROULETTE_RED_NUMBERS.contains(n))
        .count();

    if red_count >= tuning.streak_threshold {
        PredictionResult::new(
            "Black (possible reversal)",
            65.0,
            &[
                "color_distribution_analysis",
                "red_streak_detected",
                "reversion_probability",
            ],
            "Red streak detected - consider black",
            RiskLevel::Low,
        )
    } else if black_count >= tuning.streak_threshold {
        PredictionResult::new(
            "Red (possible reversal)",
            65.0,
            &[
                "color_distribution_analysis",
                "black_streak_detected",
                "reversion_probability",
            ],
            "Black streak detected - consider red",
            RiskLevel::Low,
        )
    } else {
        PredictionResult::new(
            "Balance between red and black",
            50.0,
            &["color_distribution_analysis"],
            "Stick to even-money bets",
            RiskLevel::Medium,
        )
    }
}

pub fn classify_generic() -> PredictionResult {
    PredictionResult::new(
        "Generic analysis",
        50.0,
        &["generic_analysis"],
        "Use conservative strategies",
        RiskLevel::Medium,
    )
}

/// Pocket number from `game_data.result`; integral floats such as `3.0` count as well.
fn roulette_number(game_data: &Value) -> Option<u64> {
    let number = game_data.get("result")?.as_f64()?;
    if number.fract() != 0.0 || !(0.0..=36.0).contains(&number) {
        return None;
    }
    Some(number as u64)
}

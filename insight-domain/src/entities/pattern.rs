// Pattern entity
// Recurring pattern per game type, unique by (game_type, pattern_type).
// `payload` is the latest observation while `frequency` counts every observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pattern type written by live ingestion.
pub const REAL_TIME_UPDATE: &str = "real_time_update";

const PROBABILITY_CAP: f64 = 0.95;
const GENERIC_DESCRIPTION: &str = "Pattern detected by the insight engine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub game_type: String,
    pub pattern_type: String,
    pub payload: Value,
    pub frequency: u64,
    pub last_seen: DateTime<Utc>,
}

impl PatternRecord {
    pub fn first_seen(
        game_type: &str,
        pattern_type: &str,
        payload: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            game_type: game_type.to_string(),
            pattern_type: pattern_type.to_string(),
            payload,
            frequency: 1,
            last_seen: now,
        }
    }

    pub fn touch(&mut self, payload: Value, now: DateTime<Utc>) {
        self.frequency = self.frequency.saturating_add(1);
        self.payload = payload;
        self.last_seen = now;
    }

    /// Display heuristic: linear in frequency, capped at 0.95. Not a calibrated probability.
    pub fn probability(&self) -> f64 {
        (self.frequency as f64 / 100.0).min(PROBABILITY_CAP)
    }

    pub fn describe(&self) -> String {
        describe_pattern(&self.pattern_type, &self.payload)
            .unwrap_or_else(|| GENERIC_DESCRIPTION.to_string())
    }

    pub fn to_view(&self) -> PatternView {
        PatternView {
            pattern_type: self.pattern_type.clone(),
            frequency: self.frequency,
            last_occurrence: self.last_seen,
            probability: self.probability(),
            description: self.describe(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternView {
    pub pattern_type: String,
    pub frequency: u64,
    pub last_occurrence: DateTime<Utc>,
    pub probability: f64,
    pub description: String,
}

fn describe_pattern(pattern_type: &str, payload: &Value) -> Option<String> {
    let number = |field: &str| payload.get(field).and_then(Value::as_f64);
    let text = |field: &str| {
        payload.get(field).and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };

    match pattern_type {
        "crash_sequence" => number("probability").map(|p| {
            format!("Crash sequence detected with {:.1}% probability", p * 100.0)
        }),
        "high_multiplier" => {
            let threshold = text("threshold")?;
            let frequency = text("frequency")?;
            Some(format!(
                "High multipliers (>{}x) occur {}",
                threshold, frequency
            ))
        }
        "safe_zones" => number("success_rate")
            .map(|rate| format!("Safe zones identified with {:.1}% success", rate * 100.0)),
        "color_streak" => {
            let color = text("color")?;
            let max_streak = text("max_streak")?;
            Some(format!(
                "{} streak with a maximum of {} occurrences",
                color, max_streak
            ))
        }
        "number_frequency" => {
            let value = text("number")?;
            let frequency = number("frequency")?;
            Some(format!(
                "Number {} appears with a frequency of {:.1}%",
                value,
                frequency * 100.0
            ))
        }
        REAL_TIME_UPDATE => {
            text("timestamp").map(|at| format!("Live observation recorded at {}", at))
        }
        _ => None,
    }
}

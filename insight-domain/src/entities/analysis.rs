// Analysis entities
// PredictionResult and GameInsight are transient values computed per call;
// AnalysisRecord is the append-only log entry persisted after each computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::PatternView;
use crate::utils::mean;
use crate::value_objects::RiskLevel;

pub const COMPLETE_ANALYSIS: &str = "complete_analysis";

/// Confidence reported when there is nothing to average.
pub const DEFAULT_CONFIDENCE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Value(f64),
    Text(String),
}

impl From<f64> for Prediction {
    fn from(value: f64) -> Self {
        Prediction::Value(value)
    }
}

impl From<&str> for Prediction {
    fn from(value: &str) -> Self {
        Prediction::Text(value.to_string())
    }
}

impl From<String> for Prediction {
    fn from(value: String) -> Self {
        Prediction::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Prediction,
    pub confidence: f64,
    pub factors: Vec<String>,
    pub recommendation: String,
    pub risk_level: RiskLevel,
}

impl PredictionResult {
    pub fn new(
        prediction: impl Into<Prediction>,
        confidence: f64,
        factors: &[&str],
        recommendation: &str,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            prediction: prediction.into(),
            confidence: confidence.clamp(0.0, 100.0),
            factors: factors.iter().map(|factor| factor.to_string()).collect(),
            recommendation: recommendation.to_string(),
            risk_level,
        }
    }

    /// Placeholder returned when a classifier has fewer samples than it needs.
    pub fn insufficient_data(
        prediction: impl Into<Prediction>,
        confidence: f64,
        recommendation: &str,
    ) -> Self {
        Self::new(
            prediction,
            confidence,
            &["insufficient_data"],
            recommendation,
            RiskLevel::Medium,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInsight {
    pub game_type: String,
    pub insights: Vec<String>,
    pub predictions: Vec<PredictionResult>,
    pub patterns: Vec<PatternView>,
    pub alerts: Vec<String>,
    pub confidence_score: f64,
}

impl GameInsight {
    pub fn assemble(
        game_type: &str,
        insights: Vec<String>,
        predictions: Vec<PredictionResult>,
        patterns: Vec<PatternView>,
        alerts: Vec<String>,
    ) -> Self {
        let confidence_score = aggregate_confidence(&predictions);
        Self {
            game_type: game_type.to_string(),
            insights,
            predictions,
            patterns,
            alerts,
            confidence_score,
        }
    }

    pub fn top_prediction(&self) -> Option<&PredictionResult> {
        self.predictions.first()
    }
}

/// Arithmetic mean of the prediction confidences, 50 when there are none.
pub fn aggregate_confidence(predictions: &[PredictionResult]) -> f64 {
    let confidences: Vec<f64> = predictions.iter().map(|p| p.confidence).collect();
    mean(&confidences).unwrap_or(DEFAULT_CONFIDENCE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub game_type: String,
    pub analysis_type: String,
    pub payload: GameInsight,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn complete(id: String, insight: &GameInsight, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            game_type: insight.game_type.clone(),
            analysis_type: COMPLETE_ANALYSIS.to_string(),
            payload: insight.clone(),
            confidence_score: insight.confidence_score,
            created_at,
        }
    }
}

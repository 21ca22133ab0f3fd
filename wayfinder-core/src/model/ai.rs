use serde::{Deserialize, Serialize};

/// Response of the prediction endpoint. Durations are seconds, distances
/// meters; scores live in `[0, 1]`. Ephemeral: dropped on clear or when
/// augmentation is toggled off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub confidence: f64,
    pub estimated_duration: f64,
    pub estimated_distance: f64,
    pub efficiency_score: f64,
    pub recommendation: String,
    #[serde(default)]
    pub optimization_suggestions: Vec<String>,
}

/// Response of the advanced-optimization endpoint. Optional and additive;
/// its absence never invalidates a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimized_duration: f64,
    pub optimized_distance: f64,
    #[serde(default)]
    pub fuel_savings: f64,
    #[serde(default)]
    pub cost_savings: f64,
}

/// Merged augmentation bundle shown on top of the base route.
///
/// Rebuilt from scratch on every successful augmentation; never patched in
/// place, so the view is always consistent with its sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRouteView {
    pub prediction: PredictionResult,
    pub optimization: Option<OptimizationResult>,
    pub is_ai_recommended: bool,
    pub ai_label: String,
    pub efficiency_score: f64,
    pub recommendation: String,
}

impl AiRouteView {
    /// Confidence above which the prediction is surfaced as the
    /// recommended route.
    pub const RECOMMEND_CONFIDENCE: f64 = 0.7;

    pub fn merge(prediction: PredictionResult, optimization: Option<OptimizationResult>) -> Self {
        let percent = (prediction.confidence * 100.0).round() as i64;
        Self {
            is_ai_recommended: prediction.confidence > Self::RECOMMEND_CONFIDENCE,
            ai_label: format!("AI Route ({percent}% confidence)"),
            efficiency_score: prediction.efficiency_score,
            recommendation: prediction.recommendation.clone(),
            optimization,
            prediction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(confidence: f64) -> PredictionResult {
        PredictionResult {
            confidence,
            estimated_duration: 1200.0,
            estimated_distance: 9000.0,
            efficiency_score: 0.75,
            recommendation: "fastest".to_string(),
            optimization_suggestions: Vec::new(),
        }
    }

    #[test]
    fn high_confidence_is_recommended() {
        let view = AiRouteView::merge(prediction(0.82), None);
        assert!(view.is_ai_recommended);
        assert!(view.ai_label.contains("82% confidence"));
        assert_eq!(view.recommendation, "fastest");
    }

    #[test]
    fn threshold_is_strict() {
        let view = AiRouteView::merge(prediction(0.7), None);
        assert!(!view.is_ai_recommended);
    }

    #[test]
    fn optimization_is_additive() {
        let optimization = OptimizationResult {
            optimized_duration: 1100.0,
            optimized_distance: 8800.0,
            fuel_savings: 0.4,
            cost_savings: 1.2,
        };
        let with = AiRouteView::merge(prediction(0.9), Some(optimization));
        let without = AiRouteView::merge(prediction(0.9), None);
        assert!(with.optimization.is_some());
        assert!(without.optimization.is_none());
        assert_eq!(with.prediction, without.prediction);
    }
}

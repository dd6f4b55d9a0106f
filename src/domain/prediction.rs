//! Prediction result types.
//!
//! Represents the classification returned by the remote analysis service.

use serde::{Deserialize, Serialize};

/// Heat-map reference shown when the service does not provide one.
pub const PLACEHOLDER_HEATMAP: &str =
    "https://via.placeholder.com/400x400/008B8B/FFFFFF?text=Heatmap+Processing";

/// Risk band derived from the prediction probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    /// Probability below 0.4
    Low,
    /// Probability in [0.4, 0.7)
    Moderate,
    /// Probability of 0.7 or more
    High,
}

impl RiskTier {
    /// Classify a probability. NaN falls into `High`.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.4 {
            Self::Low
        } else if probability < 0.7 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Label shown next to the confidence bar.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate",
            Self::High => "High Risk",
        }
    }

    /// Label colour (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (0x40, 0x91, 0x6c),      // #40916c
            Self::Moderate => (0xf7, 0x7f, 0x00), // #f77f00
            Self::High => (0xd0, 0x00, 0x00),     // #d00000
        }
    }

    /// Style class applied to the confidence bar.
    #[must_use]
    pub fn bar_class(&self) -> &'static str {
        match self {
            Self::Low => "bg-success",
            Self::Moderate => "bg-warning",
            Self::High => "bg-danger",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Response of the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted lesion label
    #[serde(default)]
    pub prediction: Option<String>,

    /// Probability of the predicted label (0.0 to 1.0)
    pub probability: f64,

    /// Heat-map image reference, if the service produced one
    #[serde(default)]
    pub heatmap: Option<String>,

    /// Coarse confidence bucket reported by some service versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

impl PredictionResult {
    #[must_use]
    pub fn new(prediction: impl Into<String>, probability: f64) -> Self {
        Self {
            prediction: Some(prediction.into()),
            probability,
            heatmap: None,
            confidence: None,
        }
    }

    /// Label to display, `Unknown` when absent or blank.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.prediction.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => "Unknown",
        }
    }

    #[must_use]
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_probability(self.probability)
    }

    /// Probability as a percentage rounded to one decimal.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        round_percentage(self.probability)
    }

    /// Probability formatted for display, e.g. `82.3%`.
    #[must_use]
    pub fn percentage_text(&self) -> String {
        format_percentage(self.probability)
    }

    /// Heat-map reference, or the placeholder.
    #[must_use]
    pub fn heatmap_or_placeholder(&self) -> &str {
        match self.heatmap.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => PLACEHOLDER_HEATMAP,
        }
    }
}

fn round_percentage(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}

/// Format a probability in [0, 1] as a percentage with exactly one decimal.
///
/// Rounds half away from zero, matching [`PredictionResult::percentage`].
#[must_use]
pub fn format_percentage(probability: f64) -> String {
    format!("{:.1}%", round_percentage(probability))
}

/// Explanation paragraphs for a prediction.
#[must_use]
pub fn explanation(label: &str, percentage_text: &str) -> Vec<String> {
    vec![
        format!(
            "Based on the analysis of the dermoscopic image, the AI model has detected characteristics consistent with {label}."
        ),
        format!(
            "The model identified specific patterns and features in the lesion that suggest this classification with {percentage_text} confidence."
        ),
        "Note: This is an automated analysis and should not replace professional medical examination."
            .to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(RiskTier::from_probability(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.399), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.4), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.699), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.7), RiskTier::High);
        assert_eq!(RiskTier::from_probability(1.0), RiskTier::High);
        assert_eq!(RiskTier::from_probability(f64::NAN), RiskTier::High);
    }

    #[test]
    fn test_tier_is_total_over_unit_interval() {
        for i in 0..=1000 {
            let p = f64::from(i) / 1000.0;
            let tier = RiskTier::from_probability(p);
            let expected = if p < 0.4 {
                RiskTier::Low
            } else if p < 0.7 {
                RiskTier::Moderate
            } else {
                RiskTier::High
            };
            assert_eq!(tier, expected, "p = {p}");
        }
    }

    #[test]
    fn test_percentage_has_one_decimal() {
        assert_eq!(format_percentage(0.823), "82.3%");
        assert_eq!(format_percentage(0.82), "82.0%");
        assert_eq!(format_percentage(0.0), "0.0%");
        assert_eq!(format_percentage(1.0), "100.0%");
        assert_eq!(format_percentage(0.05), "5.0%");
    }

    #[test]
    fn test_bar_and_text_agree_on_ties() {
        // 6.25 is exact in binary; both must round it the same way.
        let result = PredictionResult::new("Dermatofibroma", 0.0625);
        assert_eq!(result.percentage(), 6.3);
        assert_eq!(result.percentage_text(), "6.3%");

        for i in 0..=2000 {
            let result = PredictionResult::new("x", f64::from(i) / 2000.0);
            assert_eq!(
                result.percentage_text(),
                format!("{:.1}%", result.percentage()),
                "p = {}",
                result.probability
            );
        }
    }

    #[test]
    fn test_tier_bar_classes() {
        assert_eq!(RiskTier::Low.bar_class(), "bg-success");
        assert_eq!(RiskTier::Moderate.bar_class(), "bg-warning");
        assert_eq!(RiskTier::High.bar_class(), "bg-danger");
    }

    #[test]
    fn test_deserialize_service_response() {
        let json = r#"{"prediction":"Melanocytic nevi (nv)","probability":0.85,"confidence":"high","heatmap":"path/to/heatmap.png"}"#;
        let result: PredictionResult = serde_json::from_str(json).expect("Should parse");
        assert_eq!(result.label(), "Melanocytic nevi (nv)");
        assert_eq!(result.risk_tier(), RiskTier::High);
        assert_eq!(result.heatmap_or_placeholder(), "path/to/heatmap.png");
        assert_eq!(result.confidence.as_deref(), Some("high"));
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let result: PredictionResult =
            serde_json::from_str(r#"{"probability":0.2}"#).expect("Should parse");
        assert_eq!(result.label(), "Unknown");
        assert_eq!(result.heatmap_or_placeholder(), PLACEHOLDER_HEATMAP);
    }

    #[test]
    fn test_explanation_interpolates_label_and_percentage() {
        let text = explanation("Melanoma", "82.0%").join(" ");
        assert!(text.contains("consistent with Melanoma."));
        assert!(text.contains("with 82.0% confidence"));
        assert!(text.contains("should not replace professional medical examination"));
    }
}

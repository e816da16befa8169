use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detection::DetectionRegion;
use crate::math::StatsHelper;

/// Three-tier classification of a run's mean confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Thresholds are strict: exactly 0.8 is Moderate, exactly 0.5 is Low.
    pub fn classify(mean_confidence: f64) -> Self {
        if mean_confidence > 0.8 {
            RiskLevel::High
        } else if mean_confidence > 0.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate assessment computed once when a run completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub mean_confidence: f64,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    pub fn from_regions(regions: &[DetectionRegion]) -> Option<Self> {
        let confidences: Vec<f64> = regions.iter().map(|region| region.confidence).collect();
        let mean = StatsHelper::mean(&confidences)?;
        Some(Self::from_mean(mean))
    }

    /// The score is a display transform only; the level is derived from the
    /// unrounded mean.
    pub fn from_mean(mean_confidence: f64) -> Self {
        let overall_score = (mean_confidence * 100.0).round().clamp(0.0, 100.0) as u8;
        Self {
            mean_confidence,
            overall_score,
            risk_level: RiskLevel::classify(mean_confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::source::reference_regions;

    fn regions_with(confidences: &[f64]) -> Vec<DetectionRegion> {
        confidences
            .iter()
            .enumerate()
            .map(|(idx, &confidence)| {
                DetectionRegion::new(idx as u32 + 1, 0.0, 0.0, 10.0, 10.0, confidence, "Region")
            })
            .collect()
    }

    #[test]
    fn reference_fixture_scores_75_moderate() {
        let assessment = RiskAssessment::from_regions(&reference_regions()).unwrap();
        assert_eq!(assessment.overall_score, 75);
        assert_eq!(assessment.risk_level, RiskLevel::Moderate);
        assert!((assessment.mean_confidence - 0.7533).abs() < 1e-4);
    }

    #[test]
    fn classification_covers_each_tier() {
        let high = RiskAssessment::from_regions(&regions_with(&[0.9, 0.8])).unwrap();
        assert_eq!(high.risk_level, RiskLevel::High);
        assert_eq!(high.overall_score, 85);

        let low = RiskAssessment::from_regions(&regions_with(&[0.3, 0.3])).unwrap();
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert_eq!(low.overall_score, 30);
    }

    #[test]
    fn boundaries_use_strict_comparison() {
        assert_eq!(RiskLevel::classify(0.8), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(0.5), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(0.800_001), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.500_001), RiskLevel::Moderate);
    }

    #[test]
    fn level_ignores_rounded_score() {
        // 0.804 rounds to a score of 80 but is still above the High threshold.
        let assessment = RiskAssessment::from_mean(0.804);
        assert_eq!(assessment.overall_score, 80);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn empty_region_set_has_no_assessment() {
        assert!(RiskAssessment::from_regions(&[]).is_none());
    }

    #[test]
    fn risk_level_displays_as_word() {
        assert_eq!(RiskLevel::Moderate.to_string(), "Moderate");
    }
}

use serde::{Deserialize, Serialize};

/// Checkpoints displayed while a run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStage {
    FeatureExtraction,
    TumorDetection,
    Classification,
}

impl AnalysisStage {
    pub const ALL: [AnalysisStage; 3] = [
        AnalysisStage::FeatureExtraction,
        AnalysisStage::TumorDetection,
        AnalysisStage::Classification,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::FeatureExtraction => "Feature extraction",
            AnalysisStage::TumorDetection => "Tumor detection",
            AnalysisStage::Classification => "Classification",
        }
    }

    pub fn threshold(&self) -> u8 {
        match self {
            AnalysisStage::FeatureExtraction => 33,
            AnalysisStage::TumorDetection => 66,
            AnalysisStage::Classification => 99,
        }
    }

    pub fn is_reached(&self, progress: u8) -> bool {
        progress > self.threshold()
    }

    pub fn reached(progress: u8) -> Vec<AnalysisStage> {
        Self::ALL
            .iter()
            .copied()
            .filter(|stage| stage.is_reached(progress))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_light_up_strictly_after_threshold() {
        assert!(AnalysisStage::reached(33).is_empty());
        assert_eq!(
            AnalysisStage::reached(34),
            vec![AnalysisStage::FeatureExtraction]
        );
        assert_eq!(AnalysisStage::reached(99).len(), 2);
        assert_eq!(AnalysisStage::reached(100).len(), 3);
    }
}

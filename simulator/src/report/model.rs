use scancore::analysis::{AnalysisRun, AnalysisStage};
use scancore::RiskLevel;
use serde::{Deserialize, Serialize};

pub const SIMULATION_NOTICE: &str = "These results are simulated for demonstration purposes. \
In a real medical environment, all findings should be reviewed by qualified healthcare professionals.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStatus {
    pub label: String,
    pub reached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub id: u32,
    pub label: String,
    pub position: String,
    pub confidence_percent: u32,
}

/// Serializable summary of one completed (or abandoned) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: u64,
    pub image: String,
    pub progress: u8,
    pub complete: bool,
    pub overall_score: Option<u8>,
    pub risk_level: Option<RiskLevel>,
    pub mean_confidence: Option<f64>,
    pub stages: Vec<StageStatus>,
    pub regions: Vec<RegionEntry>,
    pub notice: String,
}

impl AnalysisReport {
    pub fn from_run(run: &AnalysisRun) -> Self {
        let stages = AnalysisStage::ALL
            .iter()
            .map(|stage| StageStatus {
                label: stage.label().to_string(),
                reached: stage.is_reached(run.progress()),
            })
            .collect();
        let regions = run
            .regions()
            .iter()
            .map(|region| RegionEntry {
                id: region.id,
                label: region.label.clone(),
                position: region.describe_geometry(),
                confidence_percent: region.confidence_percent(),
            })
            .collect();

        Self {
            run_id: run.id().0,
            image: run.image().describe(),
            progress: run.progress(),
            complete: run.is_complete(),
            overall_score: run.overall_score(),
            risk_level: run.risk_level(),
            mean_confidence: run.assessment().map(|assessment| assessment.mean_confidence),
            stages,
            regions,
            notice: SIMULATION_NOTICE.to_string(),
        }
    }

    pub fn summary_line(&self) -> String {
        let score = self
            .overall_score
            .map(|score| format!("{}%", score))
            .unwrap_or_else(|| "n/a".into());
        let risk = self
            .risk_level
            .map(|level| level.to_string())
            .unwrap_or_else(|| "n/a".into());
        format!(
            "run={} image={} regions={} score={} risk={}",
            self.run_id,
            self.image,
            self.regions.len(),
            score,
            risk
        )
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::stage::AnalysisStage;
use crate::analysis::simulator::RunEvent;
use crate::detection::{DetectionRegion, RiskAssessment, RiskLevel};
use crate::prelude::ImageRef;

/// Identity of one submitted run, unique per simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    Complete,
}

/// Run-scoped state owned by the host. Phases only move forward and the
/// region set is frozen once the completion event has been applied.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    id: RunId,
    image: ImageRef,
    progress: u8,
    phase: RunPhase,
    regions: Vec<DetectionRegion>,
    assessment: Option<RiskAssessment>,
}

impl AnalysisRun {
    pub fn new(id: RunId, image: ImageRef) -> Self {
        Self {
            id,
            image,
            progress: 0,
            phase: RunPhase::Running,
            regions: Vec::new(),
            assessment: None,
        }
    }

    /// Folds an event into the run. Returns whether anything changed; events
    /// for other runs, progress regressions and repeated completions are
    /// ignored.
    pub fn apply(&mut self, event: &RunEvent) -> bool {
        if event.run() != self.id {
            return false;
        }
        match event {
            RunEvent::Progress { percent, .. } => {
                let percent = (*percent).min(100);
                if percent > self.progress {
                    self.progress = percent;
                    true
                } else {
                    false
                }
            }
            RunEvent::Completed { outcome, .. } => {
                if self.phase == RunPhase::Complete {
                    return false;
                }
                self.regions = outcome.regions.clone();
                self.assessment = outcome.assessment;
                self.phase = RunPhase::Complete;
                true
            }
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RunPhase::Complete
    }

    pub fn regions(&self) -> &[DetectionRegion] {
        &self.regions
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.assessment.as_ref()
    }

    pub fn overall_score(&self) -> Option<u8> {
        self.assessment.map(|assessment| assessment.overall_score)
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.assessment.map(|assessment| assessment.risk_level)
    }

    pub fn stages_reached(&self) -> Vec<AnalysisStage> {
        AnalysisStage::reached(self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::simulator::AnalysisOutcome;
    use crate::detection::reference_regions;

    fn completed(run: RunId, regions: Vec<DetectionRegion>) -> RunEvent {
        let assessment = RiskAssessment::from_regions(&regions);
        RunEvent::Completed {
            run,
            outcome: AnalysisOutcome {
                regions,
                assessment,
            },
        }
    }

    #[test]
    fn progress_never_moves_backwards() {
        let id = RunId(1);
        let mut run = AnalysisRun::new(id, ImageRef::from_path("scan.png"));
        assert!(run.apply(&RunEvent::Progress { run: id, percent: 40 }));
        assert!(!run.apply(&RunEvent::Progress { run: id, percent: 12 }));
        assert!(run.apply(&RunEvent::Progress { run: id, percent: 250 }));
        assert_eq!(run.progress(), 100);
    }

    #[test]
    fn events_from_other_runs_are_ignored() {
        let mut run = AnalysisRun::new(RunId(2), ImageRef::from_path("scan.png"));
        assert!(!run.apply(&RunEvent::Progress {
            run: RunId(1),
            percent: 50
        }));
        assert!(!run.apply(&completed(RunId(1), reference_regions())));
        assert_eq!(run.phase(), RunPhase::Running);
        assert!(run.regions().is_empty());
        assert_eq!(run.overall_score(), None);
    }

    #[test]
    fn completion_freezes_regions() {
        let id = RunId(3);
        let mut run = AnalysisRun::new(id, ImageRef::from_path("scan.png"));
        assert!(run.apply(&completed(id, reference_regions())));
        let first_read = run.regions().to_vec();

        let replacement = vec![DetectionRegion::new(9, 0.0, 0.0, 5.0, 5.0, 0.1, "Late")];
        assert!(!run.apply(&completed(id, replacement)));

        assert_eq!(run.regions(), first_read.as_slice());
        assert_eq!(run.overall_score(), Some(75));
        assert_eq!(run.risk_level(), Some(RiskLevel::Moderate));
        assert!(run.is_complete());
    }
}

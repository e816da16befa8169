pub mod run;
pub mod simulator;
pub mod stage;

pub use run::{AnalysisRun, RunId, RunPhase};
pub use simulator::{AnalysisOutcome, AnalysisSimulator, RunEvent, RunHandle, SimulatorConfig};
pub use stage::AnalysisStage;

//! Analysis simulation and region visualization core for the scan anomaly
//! demo.
//!
//! An accepted image becomes a timed [`analysis::RunHandle`] that streams
//! progress and exactly one outcome (regions plus risk assessment). The
//! [`render`] module projects those regions back onto the image as a heatmap
//! or as labelled bounding boxes.

pub mod analysis;
pub mod detection;
pub mod math;
pub mod prelude;
pub mod render;
pub mod telemetry;

pub use analysis::{AnalysisRun, AnalysisSimulator, RunEvent, RunHandle, SimulatorConfig};
pub use detection::{DetectionRegion, RiskAssessment, RiskLevel};
pub use prelude::{AnalysisError, AnalysisResult, ImageRef};
pub use render::{OverlayMode, OverlayView, RegionRenderer};

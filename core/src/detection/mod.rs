pub mod region;
pub mod risk;
pub mod source;

pub use region::DetectionRegion;
pub use risk::{RiskAssessment, RiskLevel};
pub use source::{reference_regions, FixtureRegionSource, RegionSource, StaticRegionSource};

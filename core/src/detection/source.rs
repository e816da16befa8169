use crate::detection::DetectionRegion;
use crate::prelude::ImageRef;

/// Producer of the region set for a completed run.
pub trait RegionSource: Send + Sync {
    fn regions(&self, image: &ImageRef) -> Vec<DetectionRegion>;
}

/// The documented demo fixture. Output does not depend on the image.
pub fn reference_regions() -> Vec<DetectionRegion> {
    vec![
        DetectionRegion::new(1, 150.0, 120.0, 60.0, 40.0, 0.86, "Suspicious Region"),
        DetectionRegion::new(2, 210.0, 180.0, 30.0, 30.0, 0.68, "Potential Cyst"),
        DetectionRegion::new(3, 100.0, 150.0, 45.0, 35.0, 0.72, "Tissue Anomaly"),
    ]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegionSource;

impl RegionSource for FixtureRegionSource {
    fn regions(&self, _image: &ImageRef) -> Vec<DetectionRegion> {
        reference_regions()
    }
}

/// Returns a caller-supplied region list for every run.
#[derive(Debug, Clone)]
pub struct StaticRegionSource {
    regions: Vec<DetectionRegion>,
}

impl StaticRegionSource {
    pub fn new(regions: Vec<DetectionRegion>) -> Self {
        Self { regions }
    }
}

impl RegionSource for StaticRegionSource {
    fn regions(&self, _image: &ImageRef) -> Vec<DetectionRegion> {
        self.regions.clone()
    }
}

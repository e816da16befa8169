//! Projection of detection regions onto image-space overlays.
//!
//! Rendering is split in two: [`RenderPlan`] turns regions into a display
//! list with exact geometry, and [`raster`] executes that list on a copy of
//! the base image. [`OverlayView`] wraps the renderer with the host-side
//! readiness and re-render rules.

pub mod font;
pub mod plan;
pub mod raster;
pub mod view;

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::detection::DetectionRegion;
use crate::telemetry::LogManager;

pub use plan::{DrawOp, GradientStop, OverlayRect, RadialGradient, RenderPlan};
pub use view::OverlayView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayMode {
    #[serde(rename = "heatmap")]
    Heatmap,
    #[serde(rename = "bounding")]
    BoundingBox,
}

impl OverlayMode {
    pub const ALL: [OverlayMode; 2] = [OverlayMode::Heatmap, OverlayMode::BoundingBox];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayMode::Heatmap => "heatmap",
            OverlayMode::BoundingBox => "bounding",
        }
    }
}

impl fmt::Display for OverlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown overlay mode `{0}` (expected `heatmap` or `bounding`)")]
pub struct UnknownOverlayMode(pub String);

impl FromStr for OverlayMode {
    type Err = UnknownOverlayMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heatmap" => Ok(OverlayMode::Heatmap),
            "bounding" => Ok(OverlayMode::BoundingBox),
            _ => Err(UnknownOverlayMode(value.to_string())),
        }
    }
}

/// Stateless overlay renderer; output depends only on its inputs.
#[derive(Debug, Clone)]
pub struct RegionRenderer {
    logger: LogManager,
}

impl RegionRenderer {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("renderer"),
        }
    }

    /// Display list for an image of `image_size`; `None` while the image is
    /// unknown or there are no regions.
    pub fn plan(
        &self,
        image_size: Option<(u32, u32)>,
        regions: &[DetectionRegion],
        mode: OverlayMode,
    ) -> Option<RenderPlan> {
        let (width, height) = image_size?;
        RenderPlan::build(width, height, regions, mode)
    }

    pub fn render(
        &self,
        image: Option<&RgbaImage>,
        regions: &[DetectionRegion],
        mode: OverlayMode,
    ) -> Option<RgbaImage> {
        let image = image?;
        let plan = self.plan(Some(image.dimensions()), regions, mode)?;
        let degenerate = regions.iter().filter(|region| region.is_degenerate()).count();
        if degenerate > 0 {
            self.logger
                .debug(&format!("{} degenerate regions drawn empty", degenerate));
        }
        self.logger.debug(&format!(
            "{} overlay: {} ops on {}x{}",
            mode,
            plan.ops.len(),
            plan.width,
            plan.height
        ));
        Some(raster::rasterize(image, &plan))
    }
}

impl Default for RegionRenderer {
    fn default() -> Self {
        Self::new()
    }
}

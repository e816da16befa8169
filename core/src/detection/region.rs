use serde::{Deserialize, Serialize};

/// Scored rectangular area of interest in image-pixel coordinates
/// (origin top-left, y down).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRegion {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f64,
    pub label: String,
}

impl DetectionRegion {
    pub fn new(
        id: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        confidence: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            confidence,
            label: label.into(),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the region has no drawable area.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite());
        !finite || self.width <= 0.0 || self.height <= 0.0
    }

    /// Confidence clamped into [0, 1]; NaN reads as zero.
    pub fn unit_confidence(&self) -> f64 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.unit_confidence() * 100.0).round() as u32
    }

    /// Text shown on the bounding-box label plate.
    pub fn caption(&self) -> String {
        format!("{} ({}%)", self.label, self.confidence_percent())
    }

    pub fn describe_geometry(&self) -> String {
        format!(
            "Position: x={}, y={}, size={}\u{d7}{}",
            self.x, self.y, self.width, self.height
        )
    }
}

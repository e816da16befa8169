use image::{Rgb, Rgba};

use crate::detection::DetectionRegion;
use crate::math::StatsHelper;
use crate::render::OverlayMode;

/// #EA4335, shared by the heatmap tint and the bounding-box outline.
pub const ALERT_RED: Rgb<u8> = Rgb([234, 67, 53]);
pub const LABEL_TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const HEATMAP_OPACITY: f32 = 0.7;
pub const OUTLINE_WIDTH: f32 = 2.0;
pub const PLATE_HEIGHT: f32 = 20.0;
pub const PLATE_CHAR_WIDTH: f32 = 7.0;
pub const PLATE_PADDING: f32 = 20.0;
pub const TEXT_INSET: f32 = 5.0;

/// Axis-aligned rectangle in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-area rectangle anchored at a point; non-finite anchors collapse
    /// to the origin.
    pub fn empty_at(x: f32, y: f32) -> Self {
        let finite_or_zero = |value: f32| if value.is_finite() { value } else { 0.0 };
        Self::new(finite_or_zero(x), finite_or_zero(y), 0.0, 0.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub alpha: f32,
}

/// Radially symmetric alpha field with piecewise-linear stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: (f32, f32),
    pub radius: f32,
    pub stops: [GradientStop; 3],
}

impl RadialGradient {
    /// Full confidence at the centre, 30% of it at 0.7 r, clear at r.
    pub fn for_confidence(center: (f32, f32), radius: f32, confidence: f32) -> Self {
        Self {
            center,
            radius,
            stops: [
                GradientStop {
                    offset: 0.0,
                    alpha: confidence,
                },
                GradientStop {
                    offset: 0.7,
                    alpha: confidence * 0.3,
                },
                GradientStop {
                    offset: 1.0,
                    alpha: 0.0,
                },
            ],
        }
    }

    pub fn alpha_at(&self, distance: f32) -> f32 {
        if !(self.radius > 0.0) {
            return 0.0;
        }
        let t = distance / self.radius;
        let (first, last) = (self.stops[0], self.stops[2]);
        if t <= first.offset {
            return first.alpha;
        }
        if t >= last.offset {
            return last.alpha;
        }
        for pair in self.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t <= to.offset {
                let span = to.offset - from.offset;
                let local = if span > 0.0 { (t - from.offset) / span } else { 1.0 };
                return StatsHelper::lerp(from.alpha, to.alpha, local);
            }
        }
        last.alpha
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Copy of the source image at native resolution.
    Base { width: u32, height: u32 },
    RadialFill {
        region: u32,
        bounds: OverlayRect,
        gradient: RadialGradient,
        color: Rgb<u8>,
        opacity: f32,
    },
    StrokeRect {
        region: u32,
        rect: OverlayRect,
        line_width: f32,
        color: Rgba<u8>,
    },
    FillRect {
        region: u32,
        rect: OverlayRect,
        color: Rgba<u8>,
    },
    Text {
        region: u32,
        x: f32,
        baseline: f32,
        text: String,
        color: Rgba<u8>,
    },
}

/// Display list for one render. Built fresh per call and always starts with
/// [`DrawOp::Base`], so no output of a previous render leaks in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub mode: OverlayMode,
    pub ops: Vec<DrawOp>,
}

impl RenderPlan {
    /// `None` when there is nothing to draw on or nothing to draw.
    pub fn build(
        width: u32,
        height: u32,
        regions: &[DetectionRegion],
        mode: OverlayMode,
    ) -> Option<Self> {
        if regions.is_empty() || width == 0 || height == 0 {
            return None;
        }

        let mut ops = vec![DrawOp::Base { width, height }];
        for region in regions {
            match mode {
                OverlayMode::Heatmap => ops.push(heatmap_op(region)),
                OverlayMode::BoundingBox => ops.extend(bounding_ops(region)),
            }
        }

        Some(Self {
            width,
            height,
            mode,
            ops,
        })
    }

    pub fn overlay_ops(&self) -> &[DrawOp] {
        &self.ops[1..]
    }
}

fn heatmap_op(region: &DetectionRegion) -> DrawOp {
    let confidence = region.unit_confidence() as f32;
    if region.is_degenerate() {
        let anchor = OverlayRect::empty_at(region.x, region.y);
        return DrawOp::RadialFill {
            region: region.id,
            bounds: anchor,
            gradient: RadialGradient::for_confidence((anchor.x, anchor.y), 0.0, confidence),
            color: ALERT_RED,
            opacity: HEATMAP_OPACITY,
        };
    }

    let (cx, cy) = region.center();
    let radius = region.width.max(region.height);
    DrawOp::RadialFill {
        region: region.id,
        bounds: OverlayRect::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0),
        gradient: RadialGradient::for_confidence((cx, cy), radius, confidence),
        color: ALERT_RED,
        opacity: HEATMAP_OPACITY,
    }
}

fn bounding_ops(region: &DetectionRegion) -> Vec<DrawOp> {
    let outline = Rgba([ALERT_RED[0], ALERT_RED[1], ALERT_RED[2], 255]);
    if region.is_degenerate() {
        return vec![DrawOp::StrokeRect {
            region: region.id,
            rect: OverlayRect::empty_at(region.x, region.y),
            line_width: OUTLINE_WIDTH,
            color: outline,
        }];
    }

    let plate_width = PLATE_CHAR_WIDTH * region.label.chars().count() as f32 + PLATE_PADDING;
    vec![
        DrawOp::StrokeRect {
            region: region.id,
            rect: OverlayRect::new(region.x, region.y, region.width, region.height),
            line_width: OUTLINE_WIDTH,
            color: outline,
        },
        DrawOp::FillRect {
            region: region.id,
            rect: OverlayRect::new(region.x, region.y - PLATE_HEIGHT, plate_width, PLATE_HEIGHT),
            color: outline,
        },
        DrawOp::Text {
            region: region.id,
            x: region.x + TEXT_INSET,
            baseline: region.y - TEXT_INSET,
            text: region.caption(),
            color: LABEL_TEXT,
        },
    ]
}

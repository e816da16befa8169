use image::{Rgb, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::render::font;
use crate::render::plan::{DrawOp, OverlayRect, RadialGradient, RenderPlan};

/// Executes a plan against `base`. The surface is sized by the plan, which is
/// built from the base image's own dimensions.
pub fn rasterize(base: &RgbaImage, plan: &RenderPlan) -> RgbaImage {
    let mut surface = RgbaImage::new(plan.width, plan.height);
    for op in &plan.ops {
        match op {
            DrawOp::Base { .. } => surface.clone_from(base),
            DrawOp::RadialFill {
                bounds,
                gradient,
                color,
                opacity,
                ..
            } => fill_radial(&mut surface, bounds, gradient, *color, *opacity),
            DrawOp::StrokeRect {
                rect,
                line_width,
                color,
                ..
            } => stroke_rect(&mut surface, rect, *line_width, *color),
            DrawOp::FillRect { rect, color, .. } => {
                if let Some(rect) = pixel_rect(rect, 0, surface.dimensions()) {
                    draw_filled_rect_mut(&mut surface, rect, *color);
                }
            }
            DrawOp::Text {
                x,
                baseline,
                text,
                color,
                ..
            } => font::draw_text(
                &mut surface,
                x.round() as i32,
                baseline.round() as i32,
                text,
                *color,
            ),
        }
    }
    surface
}

/// Snaps to whole pixels and grows by `outset` on every side, then clips to
/// one pixel past each surface edge so a clipped side never lands on canvas.
/// `None` for shapes without area or entirely off the surface.
fn pixel_rect(rect: &OverlayRect, outset: i32, surface: (u32, u32)) -> Option<Rect> {
    let finite = [rect.x, rect.y, rect.width, rect.height]
        .iter()
        .all(|value| value.is_finite());
    if rect.is_empty() || !finite {
        return None;
    }
    let grow = outset as f32;
    let left = rect.x.round() - grow;
    let top = rect.y.round() - grow;
    let (x0, x1) = clip_span(left, left + rect.width.round() + 2.0 * grow, surface.0)?;
    let (y0, y1) = clip_span(top, top + rect.height.round() + 2.0 * grow, surface.1)?;
    Some(Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32))
}

/// Clamps the half-open pixel span `[start, end)` to `[-1, extent + 1)`.
fn clip_span(start: f32, end: f32, extent: u32) -> Option<(i32, i32)> {
    let start = start.max(-1.0);
    let end = end.min(extent as f32 + 1.0);
    if end <= start {
        return None;
    }
    Some((start as i32, end as i32))
}

/// Stroke centred on the rectangle edge: half the width falls outside.
fn stroke_rect(surface: &mut RgbaImage, rect: &OverlayRect, line_width: f32, color: Rgba<u8>) {
    let passes = (line_width.round() as i32).max(1);
    let outer = passes / 2;
    for pass in 0..passes {
        if let Some(ring) = pixel_rect(rect, outer - pass, surface.dimensions()) {
            draw_hollow_rect_mut(surface, ring, color);
        }
    }
}

fn fill_radial(
    surface: &mut RgbaImage,
    bounds: &OverlayRect,
    gradient: &RadialGradient,
    color: Rgb<u8>,
    opacity: f32,
) {
    let (width, height) = surface.dimensions();
    let Some(area) = pixel_rect(bounds, 0, (width, height)) else {
        return;
    };
    let x_start = area.left().max(0);
    let y_start = area.top().max(0);
    let x_end = (area.right() + 1).min(width as i32);
    let y_end = (area.bottom() + 1).min(height as i32);

    let (cx, cy) = gradient.center;
    for py in y_start..y_end {
        for px in x_start..x_end {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let alpha = gradient.alpha_at(dx.hypot(dy)) * opacity;
            if alpha > 0.0 {
                blend_over(surface.get_pixel_mut(px as u32, py as u32), color, alpha);
            }
        }
    }
}

/// Source-over compositing; repeated passes accumulate tint.
fn blend_over(pixel: &mut Rgba<u8>, color: Rgb<u8>, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    for channel in 0..3 {
        let dst = pixel[channel] as f32;
        let src = color[channel] as f32;
        pixel[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    let dst_alpha = pixel[3] as f32 / 255.0;
    pixel[3] = ((alpha + dst_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}

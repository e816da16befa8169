use image::RgbaImage;

use crate::detection::DetectionRegion;
use crate::render::{OverlayMode, RegionRenderer};

/// Host-owned overlay surface. Render requests made while the image is still
/// loading are coalesced and run once, with whatever regions and mode are
/// current, when the image arrives.
#[derive(Debug, Default)]
pub struct OverlayView {
    renderer: RegionRenderer,
    image: Option<RgbaImage>,
    regions: Vec<DetectionRegion>,
    mode: Option<OverlayMode>,
    pending: bool,
    surface: Option<RgbaImage>,
    renders: usize,
}

impl OverlayView {
    pub fn new(renderer: RegionRenderer) -> Self {
        Self {
            renderer,
            ..Default::default()
        }
    }

    /// A new image is on its way: drop the old image, regions and output.
    pub fn begin_loading(&mut self) {
        self.image = None;
        self.regions.clear();
        self.surface = None;
        self.pending = false;
    }

    pub fn image_ready(&mut self, image: RgbaImage) {
        self.image = Some(image);
        if self.pending {
            self.pending = false;
            self.redraw();
        }
    }

    pub fn is_image_ready(&self) -> bool {
        self.image.is_some()
    }

    pub fn set_regions(&mut self, regions: &[DetectionRegion]) {
        self.regions = regions.to_vec();
        self.request_render();
    }

    pub fn set_mode(&mut self, mode: OverlayMode) {
        self.mode = Some(mode);
        self.request_render();
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode.unwrap_or(OverlayMode::Heatmap)
    }

    pub fn request_render(&mut self) {
        if self.image.is_none() {
            self.pending = true;
            return;
        }
        self.redraw();
    }

    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }

    /// Number of renders that produced output.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    fn redraw(&mut self) {
        let rendered = self
            .renderer
            .render(self.image.as_ref(), &self.regions, self.mode());
        if let Some(surface) = rendered {
            self.surface = Some(surface);
            self.renders += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::reference_regions;
    use image::Rgba;

    fn scan() -> RgbaImage {
        RgbaImage::from_pixel(320, 240, Rgba([30, 30, 30, 255]))
    }

    #[test]
    fn requests_while_loading_run_once_with_latest_state() {
        let mut view = OverlayView::new(RegionRenderer::new());
        view.begin_loading();
        view.set_mode(OverlayMode::Heatmap);
        view.set_regions(&reference_regions());
        view.set_mode(OverlayMode::BoundingBox);
        assert!(view.surface().is_none());
        assert_eq!(view.render_count(), 0);

        view.image_ready(scan());
        assert_eq!(view.render_count(), 1);
        let expected = RegionRenderer::new().render(
            Some(&scan()),
            &reference_regions(),
            OverlayMode::BoundingBox,
        );
        assert_eq!(view.surface(), expected.as_ref());
    }

    #[test]
    fn mode_switch_replaces_previous_overlay() {
        let mut view = OverlayView::new(RegionRenderer::new());
        view.image_ready(scan());
        view.set_regions(&reference_regions());
        view.set_mode(OverlayMode::BoundingBox);
        view.set_mode(OverlayMode::Heatmap);

        let fresh = RegionRenderer::new().render(
            Some(&scan()),
            &reference_regions(),
            OverlayMode::Heatmap,
        );
        assert_eq!(view.surface(), fresh.as_ref());
    }

    #[test]
    fn empty_regions_leave_surface_unchanged() {
        let mut view = OverlayView::new(RegionRenderer::new());
        view.image_ready(scan());
        view.set_regions(&reference_regions());
        let before = view.surface().cloned();
        let count = view.render_count();

        view.set_regions(&[]);
        assert_eq!(view.surface().cloned(), before);
        assert_eq!(view.render_count(), count);
    }

    #[test]
    fn new_image_discards_old_surface() {
        let mut view = OverlayView::new(RegionRenderer::new());
        view.image_ready(scan());
        view.set_regions(&reference_regions());
        assert!(view.surface().is_some());

        view.begin_loading();
        assert!(view.surface().is_none());
        assert!(!view.is_image_ready());
        view.image_ready(scan());
        assert!(view.surface().is_none());
    }
}

use image::RgbaImage;
use scancore::analysis::{AnalysisRun, RunEvent, RunHandle, RunId};
use scancore::telemetry::{LogManager, MetricsSnapshot};
use scancore::{
    AnalysisResult, AnalysisSimulator, ImageRef, OverlayMode, OverlayView, RegionRenderer,
};

struct ActiveRun {
    run: AnalysisRun,
    /// Released once the completion event has been applied.
    handle: Option<RunHandle>,
}

/// The hosting page: sole owner of the current run and the overlay surface.
/// A new submission replaces the previous run wholesale.
pub struct AnalysisSession {
    simulator: AnalysisSimulator,
    current: Option<ActiveRun>,
    view: OverlayView,
    logger: LogManager,
}

impl AnalysisSession {
    pub fn new(simulator: AnalysisSimulator) -> Self {
        Self {
            simulator,
            current: None,
            view: OverlayView::new(RegionRenderer::new()),
            logger: LogManager::new("session"),
        }
    }

    /// Rejected images leave the current run untouched.
    pub fn submit_image(&mut self, image: ImageRef) -> AnalysisResult<RunId> {
        let handle = self.simulator.submit(image.clone())?;
        let id = handle.id();
        if let Some(previous) = self.current.take() {
            if let Some(handle) = previous.handle {
                self.logger
                    .record(&format!("{} superseded by {}", previous.run.id(), id));
                handle.cancel();
            }
        }
        self.view.begin_loading();
        self.current = Some(ActiveRun {
            run: AnalysisRun::new(id, image),
            handle: Some(handle),
        });
        Ok(id)
    }

    /// Waits for and applies the next event of the current run. `None` when
    /// there is no run or it has already completed.
    pub async fn pump(&mut self) -> Option<RunEvent> {
        let active = self.current.as_mut()?;
        let handle = active.handle.as_mut()?;
        let event = handle.next_event().await;
        let Some(event) = event else {
            active.handle = None;
            return None;
        };
        active.run.apply(&event);
        if let RunEvent::Completed { .. } = event {
            active.handle = None;
            self.view.set_regions(active.run.regions());
        }
        Some(event)
    }

    pub fn image_ready(&mut self, image: RgbaImage) {
        self.view.image_ready(image);
    }

    pub fn set_mode(&mut self, mode: OverlayMode) {
        self.view.set_mode(mode);
    }

    pub fn run(&self) -> Option<&AnalysisRun> {
        self.current.as_ref().map(|active| &active.run)
    }

    pub fn is_complete(&self) -> bool {
        self.run().map_or(false, |run| run.is_complete())
    }

    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.simulator.metrics().snapshot()
    }

    /// Abandons any in-flight run.
    pub fn teardown(&mut self) {
        if let Some(active) = self.current.take() {
            if let Some(handle) = active.handle {
                handle.cancel();
            }
        }
        self.view.begin_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::placeholder::{
        build_placeholder_image, build_placeholder_scan, PlaceholderConfig,
    };
    use scancore::analysis::SimulatorConfig;
    use scancore::detection::reference_regions;
    use scancore::RiskLevel;
    use std::time::Duration;

    fn config() -> PlaceholderConfig {
        PlaceholderConfig {
            width: 320,
            height: 240,
            ..Default::default()
        }
    }

    fn session() -> AnalysisSession {
        AnalysisSession::new(AnalysisSimulator::new(SimulatorConfig::default()))
    }

    async fn pump_to_completion(session: &mut AnalysisSession) -> usize {
        let mut events = 0;
        while session.pump().await.is_some() {
            events += 1;
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_feeds_regions_to_the_view_once_image_arrives() {
        let mut session = session();
        session.submit_image(build_placeholder_scan(&config()).unwrap()).unwrap();
        session.set_mode(OverlayMode::BoundingBox);

        assert_eq!(pump_to_completion(&mut session).await, 102);
        let run = session.run().unwrap();
        assert!(run.is_complete());
        assert_eq!(run.progress(), 100);
        assert_eq!(run.regions(), reference_regions().as_slice());
        assert_eq!(run.risk_level(), Some(RiskLevel::Moderate));
        assert!(session.view().surface().is_none());

        session.image_ready(build_placeholder_image(&config()));
        assert_eq!(session.view().render_count(), 1);
        assert_eq!(session.view().surface().unwrap().dimensions(), (320, 240));
    }

    #[tokio::test(start_paused = true)]
    async fn resubmission_abandons_the_previous_run() {
        let mut session = session();
        let first = session
            .submit_image(build_placeholder_scan(&config()).unwrap())
            .unwrap();
        for _ in 0..10 {
            session.pump().await;
        }
        assert_eq!(session.run().unwrap().progress(), 9);

        let second = session
            .submit_image(build_placeholder_scan(&config()).unwrap())
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(session.run().unwrap().id(), second);
        assert_eq!(session.run().unwrap().progress(), 0);
        assert_eq!(session.metrics().abandoned, 1);

        pump_to_completion(&mut session).await;
        assert_eq!(session.metrics().completed, 1);
        assert_eq!(session.run().unwrap().id(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_image_keeps_the_current_run() {
        let mut session = session();
        let id = session
            .submit_image(build_placeholder_scan(&config()).unwrap())
            .unwrap();
        assert!(session
            .submit_image(ImageRef::from_path("notes.txt"))
            .is_err());
        assert_eq!(session.run().unwrap().id(), id);
        assert_eq!(session.metrics().abandoned, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_a_running_analysis() {
        let mut session = session();
        session
            .submit_image(build_placeholder_scan(&config()).unwrap())
            .unwrap();
        session.pump().await;
        session.teardown();
        tokio::time::sleep(Duration::from_millis(4000)).await;

        assert!(session.run().is_none());
        assert!(session.pump().await.is_none());
        let metrics = session.metrics();
        assert_eq!(metrics.abandoned, 1);
        assert_eq!(metrics.completed, 0);
    }
}

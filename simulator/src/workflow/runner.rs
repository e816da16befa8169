use anyhow::{bail, Context};
use image::RgbaImage;
use scancore::analysis::RunEvent;
use scancore::telemetry::MetricsSnapshot;
use scancore::{AnalysisSimulator, ImageRef, OverlayMode};

use crate::report::model::AnalysisReport;
use crate::workflow::config::WorkflowConfig;
use crate::workflow::loader::load_image;
use crate::workflow::session::AnalysisSession;

pub struct WorkflowResult {
    pub report: AnalysisReport,
    pub progress_updates: usize,
    pub surfaces: Vec<(OverlayMode, RgbaImage)>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Analyses one image end to end: the run and the image decode proceed
    /// concurrently, then every configured overlay is rendered.
    pub async fn execute(&self, image: ImageRef) -> anyhow::Result<WorkflowResult> {
        let simulator = AnalysisSimulator::with_source(
            self.config.simulator.clone(),
            self.config.region_source(),
        );
        let mut session = AnalysisSession::new(simulator);
        session
            .submit_image(image.clone())
            .context("submitting image for analysis")?;

        let loader = load_image(image);
        tokio::pin!(loader);
        let mut loaded = false;
        let mut progress_updates = 0;

        while !(loaded && session.is_complete()) {
            let running = !session.is_complete();
            tokio::select! {
                decoded = &mut loader, if !loaded => {
                    loaded = true;
                    session.image_ready(decoded?);
                }
                event = session.pump(), if running => match event {
                    Some(RunEvent::Progress { percent, .. }) => {
                        progress_updates += 1;
                        if percent % 25 == 0 {
                            log::info!("analysis {}%", percent);
                        }
                    }
                    Some(RunEvent::Completed { .. }) => {}
                    None => {
                        session.teardown();
                        bail!("analysis ended before producing results");
                    }
                },
                else => break,
            }
        }

        let mut surfaces = Vec::new();
        for mode in self.config.render_modes() {
            session.set_mode(mode);
            if let Some(surface) = session.view().surface() {
                surfaces.push((mode, surface.clone()));
            }
        }

        let run = session
            .run()
            .context("session lost its run before completion")?;
        Ok(WorkflowResult {
            report: AnalysisReport::from_run(run),
            progress_updates,
            surfaces,
            metrics: session.metrics(),
        })
    }
}

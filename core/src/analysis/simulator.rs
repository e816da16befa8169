use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::analysis::run::RunId;
use crate::detection::{DetectionRegion, FixtureRegionSource, RegionSource, RiskAssessment};
use crate::prelude::{AnalysisError, AnalysisResult, ImageRef};
use crate::telemetry::{LogManager, MetricsRecorder};

/// Timing contract of a simulated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub tick_interval_ms: u64,
    pub progress_step: u8,
    pub completion_latency_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 30,
            progress_step: 1,
            completion_latency_ms: 3000,
        }
    }
}

impl SimulatorConfig {
    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    fn normalized_step(&self) -> u8 {
        self.progress_step.max(1)
    }

    fn completion_latency(&self) -> Duration {
        Duration::from_millis(self.completion_latency_ms)
    }
}

/// Final output of a run, delivered exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub regions: Vec<DetectionRegion>,
    pub assessment: Option<RiskAssessment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Progress { run: RunId, percent: u8 },
    Completed { run: RunId, outcome: AnalysisOutcome },
}

impl RunEvent {
    pub fn run(&self) -> RunId {
        match self {
            RunEvent::Progress { run, .. } | RunEvent::Completed { run, .. } => *run,
        }
    }
}

/// Turns accepted images into timed runs. Holds no per-run state; everything
/// about a run lives in its [`RunHandle`].
pub struct AnalysisSimulator {
    config: SimulatorConfig,
    source: Arc<dyn RegionSource>,
    metrics: Arc<MetricsRecorder>,
    next_run: u64,
    logger: LogManager,
}

impl AnalysisSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_source(config, Arc::new(FixtureRegionSource))
    }

    pub fn with_source(config: SimulatorConfig, source: Arc<dyn RegionSource>) -> Self {
        Self {
            config,
            source,
            metrics: Arc::new(MetricsRecorder::new()),
            next_run: 0,
            logger: LogManager::new("simulator"),
        }
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    /// Starts a run on the current tokio runtime. Invalid references fail
    /// here, before any run exists.
    pub fn submit(&mut self, image: ImageRef) -> AnalysisResult<RunHandle> {
        if let Err(err) = image.validate() {
            self.metrics.record_rejected();
            self.logger
                .warn(&format!("rejected {}: {}", image.describe(), err));
            return Err(err);
        }

        let runtime = Handle::try_current().map_err(|_| {
            AnalysisError::Internal("no tokio runtime available to schedule the run".into())
        })?;

        self.next_run += 1;
        let id = RunId(self.next_run);
        let logger = LogManager::new(id.to_string());

        let (tx, events) = mpsc::unbounded_channel();
        // The receiver is alive, so the initial send cannot fail.
        let _ = tx.send(RunEvent::Progress {
            run: id,
            percent: 0,
        });
        let task = runtime.spawn(drive_run(
            id,
            self.config.clone(),
            self.source.clone(),
            image.clone(),
            tx,
        ));

        self.metrics.record_submitted();
        logger.record(&format!(
            "analysing {} (latency {} ms, tick {} ms)",
            image.describe(),
            self.config.completion_latency_ms,
            self.config.tick_interval().as_millis()
        ));

        Ok(RunHandle {
            id,
            events,
            task,
            finished: false,
            metrics: self.metrics.clone(),
            logger,
        })
    }
}

async fn drive_run(
    id: RunId,
    config: SimulatorConfig,
    source: Arc<dyn RegionSource>,
    image: ImageRef,
    tx: UnboundedSender<RunEvent>,
) {
    let start = Instant::now();
    let tick = config.tick_interval();
    let step = config.normalized_step();
    let mut ticker = time::interval_at(start + tick, tick);
    let completion = time::sleep_until(start + config.completion_latency());
    tokio::pin!(completion);

    let mut progress: u8 = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut completion => {
                // Progress must read 100 by the time completion is observed.
                if progress < 100 {
                    progress = 100;
                    if tx.send(RunEvent::Progress { run: id, percent: progress }).is_err() {
                        return;
                    }
                }
                let regions = source.regions(&image);
                let assessment = RiskAssessment::from_regions(&regions);
                let _ = tx.send(RunEvent::Completed {
                    run: id,
                    outcome: AnalysisOutcome { regions, assessment },
                });
                return;
            }
            _ = ticker.tick(), if progress < 100 => {
                progress = progress.saturating_add(step).min(100);
                if tx.send(RunEvent::Progress { run: id, percent: progress }).is_err() {
                    return;
                }
            }
        }
    }
}

/// Exclusive view of one run's events. Dropping the handle (or calling
/// [`RunHandle::cancel`]) stops the run task and discards anything still
/// queued, so an abandoned run can never be observed completing.
pub struct RunHandle {
    id: RunId,
    events: UnboundedReceiver<RunEvent>,
    task: JoinHandle<()>,
    finished: bool,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl RunHandle {
    pub fn id(&self) -> RunId {
        self.id
    }

    /// True once the completion event has been handed out.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub async fn next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await?;
        self.observe(&event);
        Some(event)
    }

    pub fn try_next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.try_recv().ok()?;
        self.observe(&event);
        Some(event)
    }

    /// Runs to completion, forwarding progress and the single outcome.
    /// Returns `false` if the run ended without completing.
    pub async fn drive<P, C>(mut self, mut on_progress: P, on_complete: C) -> bool
    where
        P: FnMut(u8),
        C: FnOnce(AnalysisOutcome),
    {
        while let Some(event) = self.next_event().await {
            match event {
                RunEvent::Progress { percent, .. } => on_progress(percent),
                RunEvent::Completed { outcome, .. } => {
                    on_complete(outcome);
                    return true;
                }
            }
        }
        false
    }

    pub fn cancel(self) {
        self.logger.record("cancelled by host");
    }

    fn observe(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Progress { percent, .. } => {
                self.logger.debug(&format!("progress {}%", percent));
            }
            RunEvent::Completed { outcome, .. } => {
                self.finished = true;
                self.metrics.record_completed();
                match &outcome.assessment {
                    Some(assessment) => self.logger.record(&format!(
                        "complete: {} regions, score {}%, {} risk",
                        outcome.regions.len(),
                        assessment.overall_score,
                        assessment.risk_level
                    )),
                    None => self.logger.record("complete: no regions"),
                }
            }
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.task.abort();
        if !self.finished {
            self.events.close();
            self.metrics.record_abandoned();
            self.logger.debug("abandoned before completion");
        }
    }
}

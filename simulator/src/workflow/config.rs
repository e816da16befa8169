use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use scancore::analysis::SimulatorConfig;
use scancore::detection::{FixtureRegionSource, RegionSource, StaticRegionSource};
use scancore::{DetectionRegion, OverlayMode};
use serde::{Deserialize, Serialize};

use crate::generator::placeholder::PlaceholderConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub simulator: SimulatorConfig,
    pub modes: Vec<OverlayMode>,
    pub output_dir: PathBuf,
    /// Replaces the built-in fixture when present.
    pub regions: Option<Vec<DetectionRegion>>,
    pub placeholder: PlaceholderConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            modes: OverlayMode::ALL.to_vec(),
            output_dir: PathBuf::from("tools/data"),
            regions: None,
            placeholder: PlaceholderConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(tick_interval_ms: u64, completion_latency_ms: u64) -> Self {
        Self {
            simulator: SimulatorConfig {
                tick_interval_ms,
                completion_latency_ms,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn region_source(&self) -> Arc<dyn RegionSource> {
        match &self.regions {
            Some(regions) => Arc::new(StaticRegionSource::new(regions.clone())),
            None => Arc::new(FixtureRegionSource),
        }
    }

    /// Configured modes without repeats; falls back to every mode.
    pub fn render_modes(&self) -> Vec<OverlayMode> {
        let mut modes = Vec::new();
        for mode in &self.modes {
            if !modes.contains(mode) {
                modes.push(*mode);
            }
        }
        if modes.is_empty() {
            modes = OverlayMode::ALL.to_vec();
        }
        modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancore::ImageRef;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_sets_timings() {
        let cfg = WorkflowConfig::from_args(10, 500);
        assert_eq!(cfg.simulator.tick_interval_ms, 10);
        assert_eq!(cfg.simulator.completion_latency_ms, 500);
        assert_eq!(cfg.simulator.progress_step, 1);
        assert_eq!(cfg.render_modes(), OverlayMode::ALL.to_vec());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"simulator:\n  completion_latency_ms: 1200\nmodes: [bounding, bounding]\noutput_dir: out\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.simulator.completion_latency_ms, 1200);
        assert_eq!(cfg.simulator.tick_interval_ms, 30);
        assert_eq!(cfg.render_modes(), vec![OverlayMode::BoundingBox]);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn yaml_regions_replace_the_fixture() {
        let yaml = "regions:\n  - id: 1\n    x: 10\n    y: 12\n    width: 30\n    height: 20\n    confidence: 0.91\n    label: Mass\n";
        let cfg: WorkflowConfig = serde_yaml::from_str(yaml).unwrap();
        let regions = cfg.region_source().regions(&ImageRef::from_path("scan.png"));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].label, "Mass");
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = WorkflowConfig::load("does/not/exist.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.yaml"));
    }
}

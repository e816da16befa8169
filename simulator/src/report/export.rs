use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::workflow::runner::WorkflowResult;

pub const SUMMARY_LOG: &str = "analysis.log";

/// Writes one PNG per rendered mode plus `report.json`, and appends the run
/// summary to the shared log. Returns the files written.
pub fn write_artifacts(result: &WorkflowResult, output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for (mode, surface) in &result.surfaces {
        let path = output_dir.join(format!("run{}_{}.png", result.report.run_id, mode));
        surface
            .save(&path)
            .with_context(|| format!("writing overlay {}", path.display()))?;
        written.push(path);
    }

    let report_path = output_dir.join(format!("run{}_report.json", result.report.run_id));
    let json = serde_json::to_string_pretty(&result.report).context("serializing report")?;
    fs::write(&report_path, json)
        .with_context(|| format!("writing report {}", report_path.display()))?;
    written.push(report_path);

    let log_path = output_dir.join(SUMMARY_LOG);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;
    writeln!(
        file,
        "{} progress_updates={}",
        result.report.summary_line(),
        result.progress_updates
    )?;

    Ok(written)
}

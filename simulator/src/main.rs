use anyhow::Context;
use clap::Parser;
use generator::placeholder::build_placeholder_scan;
use report::export::write_artifacts;
use scancore::{ImageRef, OverlayMode};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline host for the simulated scan anomaly analysis")]
struct Args {
    /// Scan image to analyse (PNG or JPEG)
    #[arg(long)]
    image: Option<PathBuf>,
    /// Analyse a generated placeholder scan instead of a file
    #[arg(long, default_value_t = false, conflicts_with = "image")]
    placeholder: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Overlay to render: `heatmap` or `bounding`; repeat for both
    #[arg(long = "mode")]
    modes: Vec<OverlayMode>,
    /// Directory for overlays, report and summary log
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, default_value_t = 30)]
    tick_ms: u64,
    #[arg(long, default_value_t = 3000)]
    latency_ms: u64,
    /// Seed for the placeholder scan
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.tick_ms, args.latency_ms)
    };
    if !args.modes.is_empty() {
        workflow_config.modes = args.modes.clone();
    }
    if let Some(out) = &args.out {
        workflow_config.output_dir = out.clone();
    }
    if let Some(seed) = args.seed {
        workflow_config.placeholder.seed = seed;
    }

    let image = match &args.image {
        Some(path) if !args.placeholder => ImageRef::from_path(path),
        _ => {
            log::info!(
                "no scan supplied, generating {}x{} placeholder (seed {})",
                workflow_config.placeholder.width,
                workflow_config.placeholder.height,
                workflow_config.placeholder.seed
            );
            build_placeholder_scan(&workflow_config.placeholder)?
        }
    };

    let runner = Runner::new(workflow_config.clone());
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating single-threaded runtime for the analysis")?;

    let result = runtime.block_on(async {
        tokio::select! {
            result = runner.execute(image) => result.map(Some),
            interrupted = signal::ctrl_c() => {
                interrupted.context("awaiting Ctrl+C")?;
                Ok::<_, anyhow::Error>(None)
            }
        }
    })?;

    let Some(result) = result else {
        println!("Analysis interrupted; run abandoned.");
        return Ok(());
    };

    println!(
        "Analysis complete -> {} | progress updates {} | overlays {}",
        result.report.summary_line(),
        result.progress_updates,
        result.surfaces.len()
    );
    for region in &result.report.regions {
        println!(
            "  #{} {}: {} ({}% confidence)",
            region.id, region.label, region.position, region.confidence_percent
        );
    }

    let written = write_artifacts(&result, &runner.config().output_dir)?;
    for path in written {
        println!("  wrote {}", path.display());
    }
    log::debug!("metrics {:?}", result.metrics);

    Ok(())
}

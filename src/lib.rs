mod cli;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod segmentation;
pub mod settings;
pub mod track;
mod utils;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use cli::Cli;
use diagnostics::{LogDiagnostics, TraceFile};
use settings::SettingsStore;
use track::{paths, OutputColumns, SummaryWriter, TrackReader};

pub use diagnostics::{Diagnostic, DiagnosticsSink};
pub use error::{Result, TrackError};
pub use models::{IntervalKey, IntervalSummary, Position, Sample, TrackPoint};
pub use segmentation::{
    segment_track, BoundaryGap, DayCompleteness, IntervalSegmenter, SegmentExt,
    SegmentationConfig,
};

/// Everything needed to process one subject's file.
#[derive(Debug, Clone)]
pub struct TrackJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub trace_log: PathBuf,
    pub config: SegmentationConfig,
    pub spay_group: Option<String>,
}

impl TrackJob {
    /// Job with output and trace paths derived from `input`.
    pub fn for_input(input: PathBuf, config: SegmentationConfig) -> Self {
        Self {
            output: paths::default_output_path(&input),
            trace_log: paths::default_trace_path(&input),
            input,
            config,
            spay_group: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub intervals_written: usize,
}

/// Read, segment and write one track.
///
/// A contract violation stops the run with an error; rows already written for
/// earlier days stay in the output file.
pub fn process_track(job: &TrackJob) -> anyhow::Result<RunReport> {
    let reader = TrackReader::from_path(&job.input)
        .with_context(|| format!("Failed to open {}", job.input.display()))?;

    let trace = TraceFile::create(&job.trace_log)
        .with_context(|| format!("Failed to create {}", job.trace_log.display()))?;
    let segmenter =
        IntervalSegmenter::with_diagnostics(job.config.clone(), (trace, LogDiagnostics))?
            .with_spay_group(job.spay_group.clone());

    if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let columns = OutputColumns::for_config(&job.config, job.spay_group.is_some());
    let mut writer = SummaryWriter::from_path(&job.output, columns)
        .with_context(|| format!("Failed to create {}", job.output.display()))?;

    let mut stream = reader.segment_intervals(segmenter);
    let mut intervals_written = 0;
    for summary in &mut stream {
        let summary =
            summary.with_context(|| format!("Aborted processing {}", job.input.display()))?;
        writer.write(&summary)?;
        intervals_written += 1;
    }
    writer.flush()?;

    if let Some((trace, _)) = stream.diagnostics_mut() {
        if let Err(err) = trace.flush() {
            warn!("Failed to flush trace log {}: {err}", job.trace_log.display());
        }
    }

    info!(
        "{}: wrote {} intervals to {}",
        job.input.display(),
        intervals_written,
        job.output.display()
    );
    Ok(RunReport { intervals_written })
}

/// Binary entry point.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    info!("paddock-trace starting up...");

    let mut store = match &cli.config {
        Some(path) => SettingsStore::new(path.clone())?,
        None => SettingsStore::in_memory(),
    };

    let mut config = store.settings().segmentation.clone();
    cli.apply_to(&mut config)?;
    config.validate()?;
    if cli.save_config {
        store.update_segmentation(config.clone())?;
    }

    let mut job = TrackJob::for_input(cli.input.clone(), config);
    if let Some(output) = &cli.output {
        job.output = output.clone();
    }
    if let Some(trace_log) = &cli.trace_log {
        job.trace_log = trace_log.clone();
    }
    job.spay_group = cli
        .group_label()
        .or_else(|| store.settings().spay_group.clone());

    process_track(&job)?;
    Ok(())
}

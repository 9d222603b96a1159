//! Timelapse Audit CLI
//!
//! Validates a folder of camera stills, reports capture gaps, and
//! builds a time-lapse video from the valid frames.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use timelapse_audit::{
    analysis::DatasetSummary,
    assembly::FfmpegEncoder,
    metrics::{MetricsRegistry, MetricsSnapshot},
    pipeline::{BuildOutcome, FrameSize, Pipeline, PipelineConfig, PipelineError},
    report::{gap_line, write_gap_report, write_image_report},
};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "timelapse-audit", version, about = "Timelapse dataset tool")]
struct Cli {
    /// Folder containing the captured images.
    #[arg(long)]
    image_folder: PathBuf,

    /// Filename regex with one capture group around the timestamp.
    #[arg(long)]
    pattern: Option<String>,

    /// strftime-style format of the captured timestamp.
    #[arg(long)]
    timestamp_format: Option<String>,

    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Write the validation or gap report here (.json or .csv).
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write Prometheus text-format metrics here.
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Files smaller than this are marked as failing without decoding.
    #[arg(long)]
    min_bytes: Option<u64>,

    /// Pixel stddev below which a frame is flagged as flat.
    #[arg(long)]
    flat_frame_threshold: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate images.
    Check {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Report timestamp gaps.
    ReportGaps {
        #[command(flatten)]
        scan: ScanArgs,
        #[arg(long)]
        gap_minutes: Option<f64>,
    },
    /// Build video.
    Build {
        #[command(flatten)]
        scan: ScanArgs,
        #[arg(long)]
        output_video: PathBuf,
        #[arg(long)]
        fps: Option<u32>,
        #[arg(long)]
        codec: Option<String>,
        /// Output size as WIDTHxHEIGHT.
        #[arg(long)]
        resize: Option<FrameSize>,
        #[arg(long)]
        sample_minutes: Option<f64>,
        /// Fail on the first unreadable frame.
        #[arg(long)]
        strict: bool,
        /// Count frames without encoding.
        #[arg(long)]
        dry_run: bool,
    },
    /// Quick integrity test; exits 1 on invalid files or gaps.
    TestDataset {
        #[command(flatten)]
        scan: ScanArgs,
        #[arg(long)]
        gap_minutes: Option<f64>,
    },
}

impl Command {
    fn scan_args(&self) -> &ScanArgs {
        match self {
            Command::Check { scan }
            | Command::ReportGaps { scan, .. }
            | Command::Build { scan, .. }
            | Command::TestDataset { scan, .. } => scan,
        }
    }
}

/// Layers command-line flags over the file configuration.
fn load_config(cli: &Cli) -> Result<PipelineConfig, PipelineError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(pattern) = &cli.pattern {
        config.scan.pattern = pattern.clone();
    }
    if let Some(format) = &cli.timestamp_format {
        config.scan.timestamp_format = format.clone();
    }

    let scan = cli.command.scan_args();
    if let Some(min_bytes) = scan.min_bytes {
        config.scan.min_bytes = min_bytes;
    }
    if scan.flat_frame_threshold.is_some() {
        config.scan.flat_threshold = scan.flat_frame_threshold;
    }

    match &cli.command {
        Command::Check { .. } => {}
        Command::ReportGaps { gap_minutes, .. } | Command::TestDataset { gap_minutes, .. } => {
            if let Some(minutes) = gap_minutes {
                config.gaps.threshold_minutes = *minutes;
            }
        }
        Command::Build {
            fps,
            codec,
            resize,
            sample_minutes,
            strict,
            dry_run,
            ..
        } => {
            let video = &mut config.video;
            if let Some(fps) = fps {
                video.fps = *fps;
            }
            if let Some(codec) = codec {
                video.codec = codec.clone();
            }
            if resize.is_some() {
                video.size = *resize;
            }
            if sample_minutes.is_some() {
                video.sample_minutes = *sample_minutes;
            }
            video.strict |= *strict;
            video.dry_run |= *dry_run;
        }
    }

    Ok(config)
}

fn write_metrics(path: &Path, snapshot: &MetricsSnapshot) -> Result<(), PipelineError> {
    let registry = MetricsRegistry::new()?;
    registry.update(snapshot);
    registry.write_textfile(path)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode, PipelineError> {
    let config = load_config(cli)?;
    let pipeline = Pipeline::new(config)?;
    let records = pipeline.scan(&cli.image_folder)?;
    let summary = DatasetSummary::from_records(&records);
    let mut snapshot = MetricsSnapshot::from_summary(&summary);
    let mut code = ExitCode::SUCCESS;

    match &cli.command {
        Command::Check { .. } => {
            if let Some(path) = &cli.report_out {
                write_image_report(&records, path)?;
            }
        }
        Command::ReportGaps { .. } => {
            let gaps = pipeline.gaps(&records);
            for gap in &gaps {
                println!("{}", gap_line(gap));
            }
            if let Some(path) = &cli.report_out {
                write_gap_report(&gaps, path)?;
            }
            snapshot = snapshot.with_gaps(&gaps);
        }
        Command::Build { output_video, .. } => {
            snapshot = snapshot.with_sampled(pipeline.sampled(&records).len());
            let mut encoder = FfmpegEncoder::new();
            match pipeline.build(&records, &mut encoder, output_video)? {
                BuildOutcome::DryRun { .. } => {}
                BuildOutcome::Built(report) => snapshot = snapshot.with_build(report),
            }
        }
        Command::TestDataset { .. } => {
            if let Some(path) = &cli.report_out {
                write_image_report(&records, path)?;
            }
            let gaps = pipeline.gaps(&records);
            for gap in &gaps {
                println!("{}", gap_line(gap));
            }
            if !summary.is_healthy(&gaps) {
                info!(
                    "dataset check failed: {} invalid files, {} gaps",
                    summary.invalid,
                    gaps.len()
                );
                code = ExitCode::from(1);
            }
            snapshot = snapshot.with_gaps(&gaps);
        }
    }

    if let Some(path) = &cli.metrics_out {
        write_metrics(path, &snapshot)?;
    }
    Ok(code)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for report lines.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::from(cli.log_level).into()),
        )
        .init();

    info!("Timelapse Audit v{}", timelapse_audit::VERSION);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}

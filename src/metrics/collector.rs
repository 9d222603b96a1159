//! Metrics collection and registry.

use crate::analysis::DatasetSummary;
use crate::assembly::BuildReport;
use crate::timeline::Gap;
use crate::validation::FailureReason;
use prometheus::{Encoder, Gauge, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metric could not be created, registered or encoded.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    /// The textfile could not be written.
    #[error("failed to write metrics to {path}: {source}")]
    Io {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A snapshot of run state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Files scanned.
    pub files_total: usize,
    /// Files with no failure reasons.
    pub files_valid: usize,
    /// Files with failure reasons.
    pub files_invalid: usize,
    /// Files flagged as flat.
    pub files_flat: usize,
    /// Files failing each check.
    pub failures: BTreeMap<FailureReason, usize>,
    /// Gaps found, when gap detection ran.
    pub gaps: Option<usize>,
    /// Longest gap in minutes, when any gap was found.
    pub largest_gap_minutes: Option<f64>,
    /// Frames selected by sampling.
    pub frames_sampled: Option<usize>,
    /// Frames written and skipped, when a video was built.
    pub build: Option<BuildReport>,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a scan summary.
    pub fn from_summary(summary: &DatasetSummary) -> Self {
        Self {
            files_total: summary.total,
            files_valid: summary.valid,
            files_invalid: summary.invalid,
            files_flat: summary.flat,
            failures: summary.reason_counts.clone(),
            ..Self::default()
        }
    }

    /// Records the outcome of gap detection.
    pub fn with_gaps(mut self, gaps: &[Gap<'_>]) -> Self {
        self.gaps = Some(gaps.len());
        self.largest_gap_minutes = gaps.iter().map(|g| g.gap_minutes).reduce(f64::max);
        self
    }

    /// Records the number of sampled frames.
    pub fn with_sampled(mut self, frames: usize) -> Self {
        self.frames_sampled = Some(frames);
        self
    }

    /// Records a completed build.
    pub fn with_build(mut self, report: BuildReport) -> Self {
        self.build = Some(report);
        self
    }
}

/// Prometheus metrics registry for dataset monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Scan metrics
    files_total: IntGauge,
    files_valid: IntGauge,
    files_invalid: IntGauge,
    files_flat: IntGauge,
    failures: IntGaugeVec,

    // Gap metrics
    gaps_total: IntGauge,
    largest_gap_minutes: Gauge,

    // Assembly metrics
    frames_sampled: IntGauge,
    frames_written: IntGauge,
    frames_skipped: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all dataset metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let files_total = IntGauge::new("timelapse_files_total", "Files scanned")?;
        let files_valid = IntGauge::new(
            "timelapse_files_valid",
            "Files that passed every validation check",
        )?;
        let files_invalid = IntGauge::new(
            "timelapse_files_invalid",
            "Files with at least one failure reason",
        )?;
        let files_flat = IntGauge::new(
            "timelapse_files_flat",
            "Files flagged as flat (near-uniform) frames",
        )?;
        let failures = IntGaugeVec::new(
            Opts::new("timelapse_failures", "Files failing each validation check"),
            &["reason"],
        )?;

        let gaps_total = IntGauge::new(
            "timelapse_gaps_total",
            "Intervals between consecutive captures above the gap threshold",
        )?;
        let largest_gap_minutes = Gauge::new(
            "timelapse_largest_gap_minutes",
            "Longest interval between consecutive captures above the threshold",
        )?;

        let frames_sampled = IntGauge::new(
            "timelapse_frames_sampled",
            "Frames selected for video assembly",
        )?;
        let frames_written = IntGauge::new(
            "timelapse_frames_written",
            "Frames handed to the video encoder",
        )?;
        let frames_skipped = IntGauge::new(
            "timelapse_frames_skipped",
            "Frames skipped during assembly because they could not be decoded",
        )?;

        registry.register(Box::new(files_total.clone()))?;
        registry.register(Box::new(files_valid.clone()))?;
        registry.register(Box::new(files_invalid.clone()))?;
        registry.register(Box::new(files_flat.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(gaps_total.clone()))?;
        registry.register(Box::new(largest_gap_minutes.clone()))?;
        registry.register(Box::new(frames_sampled.clone()))?;
        registry.register(Box::new(frames_written.clone()))?;
        registry.register(Box::new(frames_skipped.clone()))?;

        // Every reason is exported, including those with no failures.
        for reason in FailureReason::ALL {
            failures.with_label_values(&[reason.as_str()]).set(0);
        }

        Ok(Self {
            registry,
            files_total,
            files_valid,
            files_invalid,
            files_flat,
            failures,
            gaps_total,
            largest_gap_minutes,
            frames_sampled,
            frames_written,
            frames_skipped,
        })
    }

    /// Updates all metrics from a snapshot of run state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.files_total.set(snapshot.files_total as i64);
        self.files_valid.set(snapshot.files_valid as i64);
        self.files_invalid.set(snapshot.files_invalid as i64);
        self.files_flat.set(snapshot.files_flat as i64);

        for reason in FailureReason::ALL {
            let count = snapshot.failures.get(&reason).copied().unwrap_or(0);
            self.failures
                .with_label_values(&[reason.as_str()])
                .set(count as i64);
        }

        // Stages that did not run leave their metrics untouched.
        if let Some(gaps) = snapshot.gaps {
            self.gaps_total.set(gaps as i64);
            self.largest_gap_minutes
                .set(snapshot.largest_gap_minutes.unwrap_or(0.0));
        }
        if let Some(sampled) = snapshot.frames_sampled {
            self.frames_sampled.set(sampled as i64);
        }
        if let Some(build) = snapshot.build {
            self.frames_written.set(build.frames_written as i64);
            self.frames_skipped.set(build.skipped as i64);
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the text exposition to `path`.
    pub fn write_textfile(&self, path: impl AsRef<Path>) -> Result<(), MetricsError> {
        let path = path.as_ref();
        let text = self.encode()?;
        std::fs::write(path, text).map_err(|source| MetricsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Wrote metrics");
        Ok(())
    }
}

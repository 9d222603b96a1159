//! Pipeline driver.
//!
//! Wires the stages together the way the command-line tool runs them:
//! scan the folder, then report validity, detect gaps on the valid
//! subset, or sample it and assemble a video.

mod config;

pub use config::{ConfigError, FrameSize, GapConfig, PipelineConfig, ScanConfig, VideoConfig};

use crate::analysis::DatasetSummary;
use crate::assembly::{build_video, AssemblyError, BuildReport, VideoEncoder};
use crate::decode::{ImageDecoder, PixelDecoder};
use crate::metrics::MetricsError;
use crate::report::ReportError;
use crate::timeline::{chronological, find_gaps, sample, Gap};
use crate::validation::{ScanError, ValidationRecord, Validator};
use std::path::Path;
use thiserror::Error;

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The image folder could not be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// A report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
    /// Video assembly stopped.
    #[error("video assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    /// Metrics could not be exported.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Result of the assembly stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Dry run: frames that would have been written.
    DryRun {
        /// Sampled frame count.
        frames: usize,
    },
    /// Frames were encoded.
    Built(BuildReport),
}

/// Configured pipeline over one decoder.
pub struct Pipeline<D> {
    config: PipelineConfig,
    validator: Validator<D>,
}

impl Pipeline<ImageDecoder> {
    /// Creates a pipeline that decodes with the `image` crate.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_decoder(config, ImageDecoder::new())
    }
}

impl<D: PixelDecoder> Pipeline<D> {
    /// Creates a pipeline with a specific decoder.
    pub fn with_decoder(config: PipelineConfig, decoder: D) -> Result<Self, PipelineError> {
        config.validate()?;
        let parser = config.scan.parser()?;
        let validator = Validator::new(parser, config.scan.validator_config(), decoder);
        Ok(Self { config, validator })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validates every file in `folder` and logs a summary.
    pub fn scan(&self, folder: &Path) -> Result<Vec<ValidationRecord>, PipelineError> {
        let records = self.validator.scan(folder)?;
        let summary = DatasetSummary::from_records(&records);

        tracing::info!(
            "scanned {} files: {} valid, {} invalid",
            summary.total,
            summary.valid,
            summary.invalid
        );
        if summary.flat > 0 {
            tracing::info!("{} suspected flat frames", summary.flat);
        }
        for record in records.iter().filter(|r| !r.is_valid()) {
            tracing::warn!(
                file = %record.file_name(),
                reasons = %record.reasons().join(";"),
                "Invalid file"
            );
        }
        Ok(records)
    }

    /// Gaps between consecutive valid records.
    pub fn gaps<'a>(&self, records: &'a [ValidationRecord]) -> Vec<Gap<'a>> {
        let gaps = find_gaps(
            records.iter().filter(|r| r.is_valid()),
            self.config.gaps.threshold_minutes,
        );
        tracing::info!("{} gaps found", gaps.len());
        gaps
    }

    /// Valid records in timestamp order, thinned to the sample interval.
    pub fn sampled<'a>(&self, records: &'a [ValidationRecord]) -> Vec<&'a ValidationRecord> {
        sample(chronological(records), self.config.video.sample_minutes)
    }

    /// Samples the valid records and encodes them into `output`.
    ///
    /// In dry-run mode the encoder is never touched.
    pub fn build<E: VideoEncoder>(
        &self,
        records: &[ValidationRecord],
        encoder: &mut E,
        output: &Path,
    ) -> Result<BuildOutcome, PipelineError> {
        let frames = self.sampled(records);

        if self.config.video.dry_run {
            tracing::info!("dry-run: {} frames would be written", frames.len());
            return Ok(BuildOutcome::DryRun {
                frames: frames.len(),
            });
        }

        let options = self.config.video.build_options(output);
        let report = build_video(frames, self.validator.decoder(), encoder, &options)?;
        Ok(BuildOutcome::Built(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::RecordingEncoder;
    use crate::decode::MockDecoder;
    use std::fs;
    use tempfile::TempDir;

    fn dataset() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in [
            "metroLocal_IPC_main_20230101000000.jpg",
            "metroLocal_IPC_main_20230101000500.jpg",
            "metroLocal_IPC_main_20230101002000.jpg",
            "metroLocal_IPC_main_20230101003000.jpg",
            "random.txt",
        ] {
            fs::write(dir.path().join(name), b"frame").unwrap();
        }
        dir
    }

    fn pipeline(mutate: impl FnOnce(&mut PipelineConfig)) -> Pipeline<MockDecoder> {
        let mut config = PipelineConfig::default();
        config.scan.min_bytes = 0;
        mutate(&mut config);
        Pipeline::with_decoder(config, MockDecoder::new(8, 6)).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.video.fps = 0;
        assert!(matches!(
            Pipeline::with_decoder(config, MockDecoder::new(1, 1)),
            Err(PipelineError::Config(ConfigError::InvalidFrameRate))
        ));
    }

    #[test]
    fn test_gaps_on_valid_subset() {
        let dir = dataset();
        let p = pipeline(|_| {});
        let records = p.scan(dir.path()).unwrap();

        let gaps = p.gaps(&records);

        assert_eq!(records.len(), 5);
        assert_eq!(gaps.len(), 1);
        assert!((gaps[0].gap_minutes - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_dry_run_skips_encoder() {
        let dir = dataset();
        let p = pipeline(|c| c.video.dry_run = true);
        let records = p.scan(dir.path()).unwrap();
        let mut encoder = RecordingEncoder::new();

        let outcome = p
            .build(&records, &mut encoder, Path::new("out.mp4"))
            .unwrap();

        assert_eq!(outcome, BuildOutcome::DryRun { frames: 4 });
        assert_eq!(encoder.opens(), 0);
    }

    #[test]
    fn test_build_uses_sampled_frames() {
        let dir = dataset();
        let p = pipeline(|c| c.video.sample_minutes = Some(10.0));
        let records = p.scan(dir.path()).unwrap();
        let mut encoder = RecordingEncoder::new();

        let outcome = p
            .build(&records, &mut encoder, Path::new("out.mp4"))
            .unwrap();

        // 00:00, 00:20, 00:30
        assert_eq!(
            outcome,
            BuildOutcome::Built(BuildReport {
                frames_written: 3,
                skipped: 0
            })
        );
        assert_eq!(encoder.settings().unwrap().fps, 30);
    }
}

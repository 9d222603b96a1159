//! Frame-by-frame video assembly.

use super::encoder::{EncoderError, EncoderSettings, VideoEncoder};
use crate::decode::{PixelDecoder, Raster};
use crate::validation::ValidationRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that end video assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Nothing valid was left to encode.
    #[error("no valid images to build video")]
    NoValidImages,
    /// The frame that fixes the output size could not be decoded.
    #[error("cannot read first image {path}: {reason}")]
    FirstFrameUnreadable {
        /// Image path.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// A frame could not be decoded in strict mode.
    #[error("unreadable image {path}: {reason}")]
    UnreadableFrame {
        /// Image path.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// The encoder failed.
    #[error(transparent)]
    Encoder(#[from] EncoderError),
}

/// Video parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Output video path.
    pub output: PathBuf,
    /// Frames per second.
    pub fps: u32,
    /// Codec identifier forwarded to the encoder.
    pub codec: String,
    /// Output size; defaults to the first frame's size.
    pub size: Option<(u32, u32)>,
    /// Abort on the first unreadable frame instead of skipping it.
    pub strict: bool,
}

impl BuildOptions {
    /// Options with the defaults of the command-line tool.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            fps: 30,
            codec: "mp4v".to_string(),
            size: None,
            strict: false,
        }
    }
}

/// Outcome of a successful assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Frames handed to the encoder.
    pub frames_written: usize,
    /// Frames skipped because they could not be decoded.
    pub skipped: usize,
}

/// Decodes `path`, describing any failure.
fn decode_checked<D: PixelDecoder>(decoder: &D, path: &Path) -> Result<Raster, String> {
    let raster = decoder.decode(path).map_err(|e| e.to_string())?;
    if raster.is_empty() {
        return Err("image has no pixels".to_string());
    }
    Ok(raster)
}

/// Decodes `path` and scales it to `size`.
fn load_frame<D: PixelDecoder>(
    decoder: &D,
    path: &Path,
    size: (u32, u32),
) -> Result<Raster, String> {
    decode_checked(decoder, path)?
        .resized(size.0, size.1)
        .ok_or_else(|| "pixel buffer does not match dimensions".to_string())
}

/// Builds a video from the valid records in `records`, in the given order.
///
/// Invalid records are ignored. Frames that fail to decode are skipped
/// and counted, or abort the build when `options.strict` is set.
pub fn build_video<'a, I, D, E>(
    records: I,
    decoder: &D,
    encoder: &mut E,
    options: &BuildOptions,
) -> Result<BuildReport, AssemblyError>
where
    I: IntoIterator<Item = &'a ValidationRecord>,
    D: PixelDecoder,
    E: VideoEncoder,
{
    let frames: Vec<_> = records.into_iter().filter(|r| r.is_valid()).collect();
    let first = frames.first().ok_or(AssemblyError::NoValidImages)?;

    let mut first_raster = None;
    let (width, height) = match options.size {
        Some(size) => size,
        None => {
            let raster = decode_checked(decoder, first.path()).map_err(|reason| {
                AssemblyError::FirstFrameUnreadable {
                    path: first.path().to_path_buf(),
                    reason,
                }
            })?;
            let size = raster.dimensions();
            first_raster = Some(raster);
            size
        }
    };

    encoder.open(&EncoderSettings {
        output: options.output.clone(),
        fps: options.fps,
        codec: options.codec.clone(),
        width,
        height,
    })?;

    let mut report = BuildReport::default();
    for record in &frames {
        let loaded = match first_raster.take() {
            Some(raster) => Ok(raster),
            None => load_frame(decoder, record.path(), (width, height)),
        };

        let frame = match loaded {
            Ok(frame) => frame,
            Err(reason) if options.strict => {
                return Err(AssemblyError::UnreadableFrame {
                    path: record.path().to_path_buf(),
                    reason,
                });
            }
            Err(reason) => {
                tracing::warn!(path = %record.path().display(), %reason, "Skipping frame");
                report.skipped += 1;
                continue;
            }
        };

        encoder.write_frame(&frame)?;
        report.frames_written += 1;
    }

    encoder.finish()?;

    tracing::info!(
        "wrote {} frames to {} ({} skipped)",
        report.frames_written,
        options.output.display(),
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::RecordingEncoder;
    use crate::decode::MockDecoder;
    use crate::validation::FailureReason;

    fn records(names: &[&str]) -> Vec<ValidationRecord> {
        names
            .iter()
            .map(|n| ValidationRecord::new(format!("/cam/{n}"), None, 1000).with_geometry(8, 6))
            .collect()
    }

    #[test]
    fn test_builds_from_first_frame_size() {
        let decoder = MockDecoder::new(8, 6);
        let mut encoder = RecordingEncoder::new();
        let recs = records(&["a.jpg", "b.jpg", "c.jpg"]);

        let report =
            build_video(&recs, &decoder, &mut encoder, &BuildOptions::new("out.mp4")).unwrap();

        assert_eq!(report, BuildReport { frames_written: 3, skipped: 0 });
        let settings = encoder.settings().unwrap();
        assert_eq!((settings.width, settings.height), (8, 6));
        assert_eq!(settings.codec, "mp4v");
        assert!(encoder.finished());
        // The first frame is decoded once and reused.
        assert_eq!(decoder.calls(), 3);
    }

    #[test]
    fn test_no_valid_images() {
        let recs: Vec<_> = records(&["a.jpg"])
            .into_iter()
            .map(|r| r.with_reason(FailureReason::Unreadable))
            .collect();
        let mut encoder = RecordingEncoder::new();

        let result = build_video(
            &recs,
            &MockDecoder::new(8, 6),
            &mut encoder,
            &BuildOptions::new("out.mp4"),
        );

        assert!(matches!(result, Err(AssemblyError::NoValidImages)));
        assert_eq!(encoder.opens(), 0);
    }

    #[test]
    fn test_unreadable_first_frame() {
        let decoder = MockDecoder::new(8, 6).fail_on("a.jpg");
        let mut encoder = RecordingEncoder::new();

        let result = build_video(
            &records(&["a.jpg", "b.jpg"]),
            &decoder,
            &mut encoder,
            &BuildOptions::new("out.mp4"),
        );

        assert!(matches!(
            result,
            Err(AssemblyError::FirstFrameUnreadable { .. })
        ));
        assert_eq!(encoder.opens(), 0);
    }

    #[test]
    fn test_explicit_size_skips_unreadable_first_frame() {
        let decoder = MockDecoder::new(8, 6).fail_on("a.jpg");
        let mut encoder = RecordingEncoder::new();
        let options = BuildOptions {
            size: Some((4, 3)),
            ..BuildOptions::new("out.mp4")
        };

        let report =
            build_video(&records(&["a.jpg", "b.jpg"]), &decoder, &mut encoder, &options).unwrap();

        assert_eq!(report, BuildReport { frames_written: 1, skipped: 1 });
        assert_eq!(encoder.frames(), &[(4, 3)]);
    }

    #[test]
    fn test_mid_run_failure_skipped_by_default() {
        let decoder = MockDecoder::new(8, 6).fail_on("b.jpg");
        let mut encoder = RecordingEncoder::new();

        let report = build_video(
            &records(&["a.jpg", "b.jpg", "c.jpg"]),
            &decoder,
            &mut encoder,
            &BuildOptions::new("out.mp4"),
        )
        .unwrap();

        assert_eq!(report, BuildReport { frames_written: 2, skipped: 1 });
    }

    #[test]
    fn test_mid_run_failure_fatal_in_strict_mode() {
        let decoder = MockDecoder::new(8, 6).fail_on("b.jpg");
        let mut encoder = RecordingEncoder::new();
        let options = BuildOptions {
            strict: true,
            ..BuildOptions::new("out.mp4")
        };

        let result = build_video(
            &records(&["a.jpg", "b.jpg", "c.jpg"]),
            &decoder,
            &mut encoder,
            &options,
        );

        assert!(matches!(result, Err(AssemblyError::UnreadableFrame { .. })));
        assert!(!encoder.finished());
    }

    #[test]
    fn test_mismatched_frames_are_resized() {
        let decoder = MockDecoder::new(8, 6).with_raster("b.jpg", Raster::filled(16, 12, [5, 5, 5]));
        let mut encoder = RecordingEncoder::new();

        build_video(
            &records(&["a.jpg", "b.jpg"]),
            &decoder,
            &mut encoder,
            &BuildOptions::new("out.mp4"),
        )
        .unwrap();

        assert_eq!(encoder.frames(), &[(8, 6), (8, 6)]);
    }
}

//! Image validator.
//!
//! Runs every check on every file so the report is complete, in a
//! fixed order: filename, size, then pixels. Decoding is skipped for
//! files below the size floor.

use super::listing::list_files;
use super::record::{FailureReason, ValidationRecord};
use crate::analysis::{pixel_stats, FlatnessThresholds};
use crate::decode::PixelDecoder;
use crate::parsing::TimestampParser;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while scanning a folder.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The folder could not be read.
    #[error("failed to list {folder}: {source}")]
    Listing {
        /// Folder that was scanned.
        folder: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Validation policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorConfig {
    /// Files smaller than this are not decoded and fail with `size`.
    pub min_bytes: u64,
    /// Enables flat-frame detection when set.
    pub flatness: Option<FlatnessThresholds>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_bytes: 5000,
            flatness: None,
        }
    }
}

/// Classifies image files.
pub struct Validator<D> {
    parser: TimestampParser,
    config: ValidatorConfig,
    decoder: D,
}

impl<D: PixelDecoder> Validator<D> {
    /// Creates a validator.
    pub fn new(parser: TimestampParser, config: ValidatorConfig, decoder: D) -> Self {
        Self {
            parser,
            config,
            decoder,
        }
    }

    /// Returns the decoder, e.g. for reuse during video assembly.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Validates a single file.
    ///
    /// Never fails: an unreadable file is a record with reasons.
    pub fn validate(&self, path: &Path) -> ValidationRecord {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        let outcome = self.parser.parse(&name);
        let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let mut record = ValidationRecord::new(path, outcome.timestamp, size_bytes);
        if !outcome.matched {
            record = record.with_reason(FailureReason::Pattern);
        } else if outcome.timestamp.is_none() {
            record = record.with_reason(FailureReason::Timestamp);
        }

        if size_bytes < self.config.min_bytes {
            record = record.with_reason(FailureReason::Size);
        } else {
            record = self.inspect_pixels(path, record);
        }

        tracing::debug!(
            path = %path.display(),
            reasons = %record.reasons().join(";"),
            flat = record.is_flat(),
            "Validated file"
        );
        record
    }

    fn inspect_pixels(&self, path: &Path, record: ValidationRecord) -> ValidationRecord {
        let raster = match self.decoder.decode(path) {
            Ok(raster) if !raster.is_empty() => raster,
            Ok(_) => return record.with_reason(FailureReason::Unreadable),
            Err(e) => {
                tracing::trace!(error = %e, "Decode failed");
                return record.with_reason(FailureReason::Unreadable);
            }
        };

        let is_flat = self
            .config
            .flatness
            .map(|thresholds| thresholds.is_flat(&pixel_stats(&raster)))
            .unwrap_or(false);

        record
            .with_geometry(raster.width(), raster.height())
            .with_flat(is_flat)
    }

    /// Validates every regular file in `folder`, in filename order.
    pub fn scan(&self, folder: &Path) -> Result<Vec<ValidationRecord>, ScanError> {
        let files = list_files(folder).map_err(|source| ScanError::Listing {
            folder: folder.to_path_buf(),
            source,
        })?;

        let records: Vec<_> = files.iter().map(|path| self.validate(path)).collect();

        tracing::debug!(
            folder = %folder.display(),
            files = records.len(),
            "Scan complete"
        );
        Ok(records)
    }
}

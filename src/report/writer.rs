//! Report rows and writers.

use crate::parsing::Timestamp;
use crate::timeline::Gap;
use crate::validation::{Reasons, ValidationRecord};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be created or flushed.
    #[error("failed to write report {path}: {source}")]
    Io {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// CSV encoding failed.
    #[error("failed to encode CSV report: {0}")]
    Csv(#[from] csv::Error),
    /// JSON encoding failed.
    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Report encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl ReportFormat {
    /// Chooses the format from the extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

/// ISO-8601 rendering used in every report.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// One row of the validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRow<'a> {
    /// Bare filename.
    pub filename: String,
    /// ISO-8601 capture time, when parsed.
    pub timestamp: Option<String>,
    /// File size on disk.
    pub size_bytes: u64,
    /// Whether decoding produced pixels.
    pub readable: bool,
    /// Decoded width.
    pub width: Option<u32>,
    /// Decoded height.
    pub height: Option<u32>,
    /// Failure reasons in check order.
    pub reasons: &'a Reasons,
    /// Advisory flat-frame flag.
    pub is_flat: bool,
}

impl<'a> From<&'a ValidationRecord> for ImageRow<'a> {
    fn from(record: &'a ValidationRecord) -> Self {
        Self {
            filename: record.file_name(),
            timestamp: record.timestamp().map(format_timestamp),
            size_bytes: record.size_bytes(),
            readable: record.readable(),
            width: record.width(),
            height: record.height(),
            reasons: record.reasons(),
            is_flat: record.is_flat(),
        }
    }
}

/// Flat variant of [`ImageRow`]; CSV cannot hold a list in a field.
#[derive(Debug, Serialize)]
struct ImageCsvRow {
    filename: String,
    timestamp: String,
    size_bytes: u64,
    readable: bool,
    width: Option<u32>,
    height: Option<u32>,
    reasons: String,
    is_flat: bool,
}

impl From<ImageRow<'_>> for ImageCsvRow {
    fn from(row: ImageRow<'_>) -> Self {
        Self {
            filename: row.filename,
            timestamp: row.timestamp.unwrap_or_default(),
            size_bytes: row.size_bytes,
            readable: row.readable,
            width: row.width,
            height: row.height,
            reasons: row.reasons.join(";"),
            is_flat: row.is_flat,
        }
    }
}

/// One row of the gap report.
#[derive(Debug, Clone, Serialize)]
pub struct GapRow {
    /// Filename before the gap.
    pub prev_file: String,
    /// Capture time before the gap.
    pub prev_ts: String,
    /// Filename after the gap.
    pub next_file: String,
    /// Capture time after the gap.
    pub next_ts: String,
    /// Length of the gap.
    pub gap_minutes: f64,
}

impl From<&Gap<'_>> for GapRow {
    fn from(gap: &Gap<'_>) -> Self {
        Self {
            prev_file: gap.prev.file_name(),
            prev_ts: gap.prev_timestamp().map(format_timestamp).unwrap_or_default(),
            next_file: gap.next.file_name(),
            next_ts: gap.next_timestamp().map(format_timestamp).unwrap_or_default(),
            gap_minutes: gap.gap_minutes,
        }
    }
}

/// Human-facing single-line rendering of a gap.
pub fn gap_line(gap: &Gap<'_>) -> String {
    let row = GapRow::from(gap);
    format!(
        "{}, {}, {}, {}, {:.1}",
        row.prev_file, row.prev_ts, row.next_file, row.next_ts, row.gap_minutes
    )
}

fn create(path: &Path) -> Result<BufWriter<File>, ReportError> {
    let io_err = |source: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    File::create(path).map(BufWriter::new).map_err(io_err)
}

fn write_json<T: Serialize>(rows: &[T], path: &Path) -> Result<(), ReportError> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_csv<T: Serialize>(
    rows: impl IntoIterator<Item = T>,
    headers: &[&str],
    path: &Path,
) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(create(path)?);
    // Written explicitly so an empty report still has a header row.
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Writes one row per scanned file to `path`.
pub fn write_image_report(records: &[ValidationRecord], path: &Path) -> Result<(), ReportError> {
    let rows: Vec<ImageRow<'_>> = records.iter().map(ImageRow::from).collect();
    match ReportFormat::from_path(path) {
        ReportFormat::Json => write_json(&rows, path)?,
        ReportFormat::Csv => write_csv(
            rows.into_iter().map(ImageCsvRow::from),
            &[
                "filename",
                "timestamp",
                "size_bytes",
                "readable",
                "width",
                "height",
                "reasons",
                "is_flat",
            ],
            path,
        )?,
    }
    tracing::info!(path = %path.display(), rows = records.len(), "Wrote image report");
    Ok(())
}

/// Writes one row per gap to `path`.
pub fn write_gap_report(gaps: &[Gap<'_>], path: &Path) -> Result<(), ReportError> {
    let rows: Vec<GapRow> = gaps.iter().map(GapRow::from).collect();
    match ReportFormat::from_path(path) {
        ReportFormat::Json => write_json(&rows, path)?,
        ReportFormat::Csv => write_csv(
            rows,
            &["prev_file", "prev_ts", "next_file", "next_ts", "gap_minutes"],
            path,
        )?,
    }
    tracing::info!(path = %path.display(), rows = gaps.len(), "Wrote gap report");
    Ok(())
}

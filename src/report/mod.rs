//! CSV and JSON reports.
//!
//! The output format follows the file extension: `.json` writes a
//! pretty-printed array, anything else writes CSV with a header row.

mod writer;

pub use writer::{
    format_timestamp, gap_line, write_gap_report, write_image_report, GapRow, ImageRow,
    ReportError, ReportFormat,
};

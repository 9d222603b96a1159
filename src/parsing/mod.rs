//! Filename timestamp extraction.
//!
//! Capture times are embedded in the image filenames by the camera.
//! This module turns a filename into a structured outcome without
//! ever failing: every malformed name is represented as data.

mod timestamp;

pub use timestamp::{parse_timestamp, ParseOutcome, PatternError, TimestampParser};

/// Capture time of an image. Filenames carry no zone information.
pub type Timestamp = chrono::NaiveDateTime;

/// Filename pattern used by the reference camera installation.
pub const DEFAULT_PATTERN: &str = r"metroLocal_IPC_main_(\d{14})\.jpg";

/// `strftime`-style template for the captured timestamp digits.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

//! Timelapse Audit Library
//!
//! Audits a folder of time-stamped stills from a fixed camera and
//! condenses the healthy subset into a time-lapse video.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! parsing → validation ─┬→ timeline::find_gaps → report
//!              ↑        └→ timeline::sample → assembly
//!           decode
//! ```
//!
//! # Design Principles
//!
//! - **Classification is data**: a bad file becomes a record with
//!   failure reasons, never an error that aborts the scan
//! - **Explicit configuration**: every stage receives its settings
//! - **Collaborators behind traits**: pixel decoding and video encoding
//!   can be swapped for mocks
//! - **Flatness is advisory**: near-uniform frames are flagged, not rejected
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use timelapse_audit::{
//!     analysis::DatasetSummary,
//!     pipeline::{Pipeline, PipelineConfig},
//! };
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let records = pipeline.scan(Path::new("/data/camera")).unwrap();
//!
//! let summary = DatasetSummary::from_records(&records);
//! let gaps = pipeline.gaps(&records);
//! println!("{} valid, {} gaps", summary.valid, gaps.len());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod assembly;
pub mod decode;
pub mod metrics;
pub mod parsing;
pub mod pipeline;
pub mod report;
pub mod timeline;
pub mod validation;

// Re-export commonly used types at crate root
pub use analysis::{DatasetSummary, FlatnessThresholds, PixelStats};
pub use assembly::{build_video, BuildOptions, BuildReport, FfmpegEncoder, VideoEncoder};
pub use decode::{ImageDecoder, PixelDecoder, Raster};
pub use parsing::{ParseOutcome, Timestamp, TimestampParser};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
pub use timeline::{find_gaps, sample, Gap};
pub use validation::{FailureReason, ValidationRecord, Validator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Prometheus metrics for dataset health.
//!
//! Metrics are written as a Prometheus text exposition file after a
//! run, suitable for a node-exporter textfile collector.
//!
//! # Metrics Exposed
//!
//! ## Scan Metrics
//! - `timelapse_files_total` - Files scanned
//! - `timelapse_files_valid` - Files that passed every check
//! - `timelapse_files_invalid` - Files with at least one failure reason
//! - `timelapse_files_flat` - Files flagged as flat frames
//! - `timelapse_failures{reason}` - Files failing each check
//!
//! ## Gap Metrics
//! - `timelapse_gaps_total` - Gaps above the threshold
//! - `timelapse_largest_gap_minutes` - Longest gap found
//!
//! ## Assembly Metrics
//! - `timelapse_frames_sampled` - Frames selected for the video
//! - `timelapse_frames_written` - Frames handed to the encoder
//! - `timelapse_frames_skipped` - Frames skipped as unreadable
//!
//! # Example
//!
//! ```no_run
//! use timelapse_audit::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let snapshot = MetricsSnapshot {
//!     files_total: 120,
//!     files_valid: 118,
//!     ..Default::default()
//! };
//! registry.update(&snapshot);
//! registry.write_textfile("timelapse.prom").expect("Failed to write metrics");
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};

//! Frame statistics and dataset health.
//!
//! This module computes per-frame pixel statistics, classifies
//! near-uniform frames, and summarizes a whole scan. Flatness is a
//! heuristic for camera faults (lens cap, glare), not a proof.

mod statistics;
mod summary;
mod threshold;

pub use statistics::{pixel_stats, PixelStats};
pub use summary::DatasetSummary;
pub use threshold::{FlatFrame, FlatnessThresholds};

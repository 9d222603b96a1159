//! Flat-frame thresholds.
//!
//! A frame is flat when its texture is below a configured floor or
//! its brightness is pinned near black or white.

use super::statistics::PixelStats;
use serde::{Deserialize, Serialize};

/// Thresholds that classify a frame as flat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatnessThresholds {
    /// Minimum standard deviation of a textured frame.
    pub min_stddev: f64,
    /// Frames darker than this mean are flat.
    pub dark_mean: f64,
    /// Frames brighter than this mean are flat.
    pub bright_mean: f64,
}

impl FlatnessThresholds {
    /// Mean below which a frame counts as black.
    pub const DEFAULT_DARK_MEAN: f64 = 5.0;
    /// Mean above which a frame counts as white.
    pub const DEFAULT_BRIGHT_MEAN: f64 = 250.0;

    /// Creates thresholds with the given texture floor and default
    /// brightness limits.
    pub fn new(min_stddev: f64) -> Self {
        Self {
            min_stddev,
            dark_mean: Self::DEFAULT_DARK_MEAN,
            bright_mean: Self::DEFAULT_BRIGHT_MEAN,
        }
    }

    /// Checks statistics against thresholds.
    pub fn check(&self, stats: &PixelStats) -> Result<(), FlatFrame> {
        if stats.stddev < self.min_stddev {
            return Err(FlatFrame::LowTexture {
                observed: stats.stddev,
                threshold: self.min_stddev,
            });
        }

        if stats.mean < self.dark_mean {
            return Err(FlatFrame::TooDark {
                observed: stats.mean,
                threshold: self.dark_mean,
            });
        }

        if stats.mean > self.bright_mean {
            return Err(FlatFrame::TooBright {
                observed: stats.mean,
                threshold: self.bright_mean,
            });
        }

        Ok(())
    }

    /// Returns true if the statistics describe a flat frame.
    pub fn is_flat(&self, stats: &PixelStats) -> bool {
        self.check(stats).is_err()
    }
}

/// Why a frame was classified as flat.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlatFrame {
    /// Too little variation between pixels.
    #[error("stddev {observed:.2} below threshold {threshold:.2}")]
    LowTexture {
        /// Measured standard deviation.
        observed: f64,
        /// Configured floor.
        threshold: f64,
    },

    /// Nearly black.
    #[error("mean {observed:.2} below dark limit {threshold:.2}")]
    TooDark {
        /// Measured mean.
        observed: f64,
        /// Configured limit.
        threshold: f64,
    },

    /// Nearly white.
    #[error("mean {observed:.2} above bright limit {threshold:.2}")]
    TooBright {
        /// Measured mean.
        observed: f64,
        /// Configured limit.
        threshold: f64,
    },
}

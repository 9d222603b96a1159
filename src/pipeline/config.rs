//! Pipeline configuration.
//!
//! Every stage receives its settings explicitly. Values come from an
//! optional TOML file and are then overridden by command-line flags.

use crate::analysis::FlatnessThresholds;
use crate::assembly::BuildOptions;
use crate::parsing::{PatternError, TimestampParser, DEFAULT_PATTERN, DEFAULT_TIMESTAMP_FORMAT};
use crate::validation::ValidatorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The filename pattern or timestamp format is unusable.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// A threshold or interval is negative or NaN.
    #[error("{name} must be a non-negative number, got {value}")]
    InvalidThreshold {
        /// Setting name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Frame rate of zero.
    #[error("invalid frame rate (must be at least 1 fps)")]
    InvalidFrameRate,
    /// Size string that is not a non-zero `WIDTHxHEIGHT`.
    #[error("invalid frame size `{0}` (expected WIDTHxHEIGHT)")]
    InvalidFrameSize(String),
    /// Codec identifier that is empty or contains whitespace.
    #[error("invalid codec identifier `{0}`")]
    InvalidCodec(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FromStr for FrameSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidFrameSize(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for FrameSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameSize> for String {
    fn from(size: FrameSize) -> Self {
        size.to_string()
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Filename and per-image validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Regex with one capture group over the timestamp.
    pub pattern: String,
    /// Parse template for the captured timestamp.
    pub timestamp_format: String,
    /// Files below this size are not decoded and fail.
    pub min_bytes: u64,
    /// Standard deviation floor; enables flat-frame detection.
    pub flat_threshold: Option<f64>,
    /// Mean below which a frame is flat.
    pub dark_mean: f64,
    /// Mean above which a frame is flat.
    pub bright_mean: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            min_bytes: 5000,
            flat_threshold: None,
            dark_mean: FlatnessThresholds::DEFAULT_DARK_MEAN,
            bright_mean: FlatnessThresholds::DEFAULT_BRIGHT_MEAN,
        }
    }
}

impl ScanConfig {
    /// Compiles the filename parser.
    pub fn parser(&self) -> Result<TimestampParser, ConfigError> {
        Ok(TimestampParser::new(&self.pattern, &self.timestamp_format)?)
    }

    /// Validator policy derived from these settings.
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            min_bytes: self.min_bytes,
            flatness: self.flat_threshold.map(|min_stddev| FlatnessThresholds {
                min_stddev,
                dark_mean: self.dark_mean,
                bright_mean: self.bright_mean,
            }),
        }
    }
}

/// Gap detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Intervals strictly longer than this are reported.
    pub threshold_minutes: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            threshold_minutes: 10.0,
        }
    }
}

/// Sampling and video assembly settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Frames per second of the output.
    pub fps: u32,
    /// Codec identifier forwarded to the encoder.
    pub codec: String,
    /// Output size; defaults to the first frame's size.
    pub size: Option<FrameSize>,
    /// Minimum minutes between selected frames; absent or zero keeps all.
    pub sample_minutes: Option<f64>,
    /// Abort on an unreadable frame instead of skipping it.
    pub strict: bool,
    /// Count frames without encoding.
    pub dry_run: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            codec: "mp4v".to_string(),
            size: None,
            sample_minutes: None,
            strict: false,
            dry_run: false,
        }
    }
}

impl VideoConfig {
    /// Encoder options for writing to `output`.
    pub fn build_options(&self, output: impl Into<PathBuf>) -> BuildOptions {
        BuildOptions {
            output: output.into(),
            fps: self.fps,
            codec: self.codec.clone(),
            size: self.size.map(|s| (s.width, s.height)),
            strict: self.strict,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `[scan]` section.
    #[serde(default)]
    pub scan: ScanConfig,
    /// `[gaps]` section.
    #[serde(default)]
    pub gaps: GapConfig,
    /// `[video]` section.
    #[serde(default)]
    pub video: VideoConfig,
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: PipelineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.parser()?;

        let thresholds = [
            ("flat threshold", self.scan.flat_threshold),
            ("dark mean", Some(self.scan.dark_mean)),
            ("bright mean", Some(self.scan.bright_mean)),
            ("gap threshold", Some(self.gaps.threshold_minutes)),
            ("sample interval", self.video.sample_minutes),
        ];
        for (name, value) in thresholds {
            if let Some(value) = value.filter(|v| v.is_nan() || *v < 0.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.video.fps == 0 {
            return Err(ConfigError::InvalidFrameRate);
        }
        let codec = &self.video.codec;
        if codec.is_empty() || codec.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidCodec(codec.clone()));
        }
        Ok(())
    }
}

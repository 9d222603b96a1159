//! Encoder abstraction.
//!
//! The builder drives any [`VideoEncoder`]; the ffmpeg-backed one is
//! used in production and [`RecordingEncoder`] in tests.

use crate::decode::Raster;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during encoder operations.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The encoder process could not be started.
    #[error("failed to start encoder `{program}`: {source}")]
    Spawn {
        /// Executable that was run.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The encoder exited unsuccessfully.
    #[error("encoder rejected codec `{codec}`: {detail}")]
    Rejected {
        /// Codec identifier that was requested.
        codec: String,
        /// Encoder stderr, or its exit status when silent.
        detail: String,
    },
    /// A frame could not be written.
    #[error("failed to write frame: {0}")]
    Write(#[source] std::io::Error),
    /// The encoder process could not be waited on.
    #[error("failed to wait for encoder: {0}")]
    Wait(#[source] std::io::Error),
    /// A frame does not match the opened size.
    #[error("frame is {actual_width}x{actual_height}, encoder expects {width}x{height}")]
    FrameSize {
        /// Opened width.
        width: u32,
        /// Opened height.
        height: u32,
        /// Frame width.
        actual_width: u32,
        /// Frame height.
        actual_height: u32,
    },
    /// `write_frame` or `finish` was called before `open`.
    #[error("encoder not opened")]
    NotOpen,
}

/// Parameters forwarded to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Output video file.
    pub output: PathBuf,
    /// Frames per second.
    pub fps: u32,
    /// Codec identifier (fourcc or encoder name).
    pub codec: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Trait for video encoders.
pub trait VideoEncoder {
    /// Starts a new video with the given settings.
    fn open(&mut self, settings: &EncoderSettings) -> Result<(), EncoderError>;

    /// Appends one frame. Frames must match the opened size.
    fn write_frame(&mut self, frame: &Raster) -> Result<(), EncoderError>;

    /// Flushes and closes the video.
    fn finish(&mut self) -> Result<(), EncoderError>;

    /// Checks if the encoder is currently open.
    fn is_open(&self) -> bool;
}

/// Encoder that keeps frame geometry in memory instead of writing a file.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    settings: Option<EncoderSettings>,
    frames: Vec<(u32, u32)>,
    finished: bool,
    opens: usize,
}

impl RecordingEncoder {
    /// Creates an encoder with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings passed to the last `open`.
    pub fn settings(&self) -> Option<&EncoderSettings> {
        self.settings.as_ref()
    }

    /// Dimensions of every frame written.
    pub fn frames(&self) -> &[(u32, u32)] {
        &self.frames
    }

    /// Whether `finish` completed.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Number of times the encoder was opened.
    pub fn opens(&self) -> usize {
        self.opens
    }
}

impl VideoEncoder for RecordingEncoder {
    fn open(&mut self, settings: &EncoderSettings) -> Result<(), EncoderError> {
        self.settings = Some(settings.clone());
        self.frames.clear();
        self.finished = false;
        self.opens += 1;
        Ok(())
    }

    fn write_frame(&mut self, frame: &Raster) -> Result<(), EncoderError> {
        let settings = self.settings.as_ref().ok_or(EncoderError::NotOpen)?;
        if frame.dimensions() != (settings.width, settings.height) {
            return Err(EncoderError::FrameSize {
                width: settings.width,
                height: settings.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            });
        }
        self.frames.push(frame.dimensions());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EncoderError> {
        if self.settings.is_none() {
            return Err(EncoderError::NotOpen);
        }
        self.finished = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.settings.is_some() && !self.finished
    }
}

//! Time-lapse video assembly.
//!
//! Sampled frames are decoded, brought to a common size and streamed
//! into a [`VideoEncoder`]. Assembly is the only stage that can end
//! a run early.

mod builder;
mod encoder;
mod ffmpeg;

pub use builder::{build_video, AssemblyError, BuildOptions, BuildReport};
pub use encoder::{EncoderError, EncoderSettings, RecordingEncoder, VideoEncoder};
pub use ffmpeg::{ffmpeg_codec_name, FfmpegEncoder};

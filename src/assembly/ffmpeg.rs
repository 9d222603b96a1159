//! Encoder backed by an `ffmpeg` child process.
//!
//! Frames are piped to ffmpeg's stdin as raw RGB24; ffmpeg handles
//! the codec and container chosen by the output extension.

use super::encoder::{EncoderError, EncoderSettings, VideoEncoder};
use crate::decode::Raster;
use std::io::{ErrorKind, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Maps a fourcc-style codec identifier to an ffmpeg encoder name.
///
/// Unknown identifiers are passed through unchanged so any encoder
/// name ffmpeg understands can be used directly.
pub fn ffmpeg_codec_name(codec: &str) -> String {
    match codec.to_ascii_lowercase().as_str() {
        "mp4v" | "fmp4" | "divx" => "mpeg4".to_string(),
        "avc1" | "h264" | "x264" => "libx264".to_string(),
        "hvc1" | "hevc" | "h265" => "libx265".to_string(),
        "mjpg" => "mjpeg".to_string(),
        "xvid" => "libxvid".to_string(),
        "vp80" => "libvpx".to_string(),
        "vp90" => "libvpx-vp9".to_string(),
        _ => codec.to_string(),
    }
}

/// Output pixel format for encoders that default to a format many
/// players reject when fed RGB input.
fn output_pix_fmt(encoder: &str) -> Option<&'static str> {
    match encoder {
        "mpeg4" | "libx264" | "libx265" | "libxvid" | "libvpx" | "libvpx-vp9" => Some("yuv420p"),
        _ => None,
    }
}

/// Streams frames into `ffmpeg`.
pub struct FfmpegEncoder {
    program: String,
    settings: Option<EncoderSettings>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    /// Uses `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Uses a specific ffmpeg executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            settings: None,
            child: None,
            stdin: None,
        }
    }

    /// Builds the ffmpeg invocation for `settings`.
    pub fn build_command(&self, settings: &EncoderSettings) -> Command {
        let mut cmd = Command::new(&self.program);
        let size = format!("{}x{}", settings.width, settings.height);
        let fps = settings.fps.to_string();
        let codec = ffmpeg_codec_name(&settings.codec);

        cmd.args([
            "-hide_banner",
            "-loglevel", "error",
            "-y",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s", size.as_str(),
            "-r", fps.as_str(),
            "-i", "pipe:0",
            "-an",
            "-c:v", codec.as_str(),
        ]);
        if let Some(pix_fmt) = output_pix_fmt(&codec) {
            // 4:2:0 chroma needs even dimensions.
            cmd.args([
                "-pix_fmt", pix_fmt,
                "-vf", "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            ]);
        }
        cmd.arg(&settings.output);

        cmd
    }

    /// Closes stdin, reaps the child and turns a failed exit into a
    /// rejection carrying its stderr.
    fn reap(&mut self, codec: &str) -> Result<(), EncoderError> {
        self.stdin = None;
        let Some(child) = self.child.take() else {
            return Ok(());
        };
        let output = child.wait_with_output().map_err(EncoderError::Wait)?;
        if output.status.success() {
            return Ok(());
        }
        let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(EncoderError::Rejected {
            codec: codec.to_string(),
            detail: if detail.is_empty() {
                format!("ffmpeg exited with {}", output.status)
            } else {
                detail
            },
        })
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn open(&mut self, settings: &EncoderSettings) -> Result<(), EncoderError> {
        let mut child = self
            .build_command(settings)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EncoderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        self.stdin = child.stdin.take();
        self.child = Some(child);
        self.settings = Some(settings.clone());

        tracing::info!(
            output = %settings.output.display(),
            codec = %settings.codec,
            fps = settings.fps,
            width = settings.width,
            height = settings.height,
            "Encoder opened"
        );
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
        let codec = settings.codec.clone();
        let stdin = self.stdin.as_mut().ok_or(EncoderError::NotOpen)?;

        match stdin.write_all(frame.pixels()) {
            Ok(()) => Ok(()),
            // ffmpeg exits early when it cannot set up the codec.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => match self.reap(&codec) {
                Err(err) => Err(err),
                Ok(()) => Err(EncoderError::Write(e)),
            },
            Err(e) => Err(EncoderError::Write(e)),
        }
    }

    fn finish(&mut self) -> Result<(), EncoderError> {
        let settings = self.settings.take().ok_or(EncoderError::NotOpen)?;
        self.reap(&settings.codec)?;
        tracing::debug!(output = %settings.output.display(), "Encoder finished");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

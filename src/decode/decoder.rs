//! Decoder abstraction over image files.
//!
//! Validation and video assembly only need a raster or a failure,
//! so the codec sits behind a trait with a real `image`-backed
//! implementation and a mock for tests.

use super::Raster;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while decoding an image file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be opened or sniffed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Image path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The codec rejected the contents.
    #[error("failed to decode {path}: {reason}")]
    Codec {
        /// Image path.
        path: PathBuf,
        /// Codec message.
        reason: String,
    },
    /// Decoding produced a zero-area image.
    #[error("decoded image {path} has no pixels")]
    Empty {
        /// Image path.
        path: PathBuf,
    },
}

/// Trait for pixel decoders.
pub trait PixelDecoder {
    /// Decodes the file at `path` into an RGB raster.
    fn decode(&self, path: &Path) -> Result<Raster, DecodeError>;
}

impl<D: PixelDecoder + ?Sized> PixelDecoder for &D {
    fn decode(&self, path: &Path) -> Result<Raster, DecodeError> {
        (**self).decode(path)
    }
}

/// Decoder backed by the `image` crate.
///
/// Format is detected from the file contents, not the extension.
/// Grayscale and alpha images are converted to 8-bit RGB.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl ImageDecoder {
    /// Creates a decoder.
    pub fn new() -> Self {
        Self
    }
}

impl PixelDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Raster, DecodeError> {
        let reader = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| DecodeError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let decoded = reader.decode().map_err(|e| DecodeError::Codec {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let raster = Raster::from(decoded.into_rgb8());
        if raster.is_empty() {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }

        tracing::trace!(
            path = %path.display(),
            width = raster.width(),
            height = raster.height(),
            "Decoded image"
        );
        Ok(raster)
    }
}

/// Mock decoder for testing that returns synthetic rasters.
///
/// Every path decodes to a solid raster unless its filename was
/// registered with [`MockDecoder::fail_on`] or given an explicit raster.
#[derive(Debug)]
pub struct MockDecoder {
    width: u32,
    height: u32,
    fill: [u8; 3],
    failing: HashSet<String>,
    overrides: HashMap<String, Raster>,
    calls: Cell<usize>,
}

impl MockDecoder {
    /// Creates a mock producing mid-gray rasters of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fill: [128, 128, 128],
            failing: HashSet::new(),
            overrides: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    /// Sets the fill colour of generated rasters.
    pub fn with_fill(mut self, rgb: [u8; 3]) -> Self {
        self.fill = rgb;
        self
    }

    /// Makes decoding of the named file fail.
    pub fn fail_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Returns `raster` when the named file is decoded.
    pub fn with_raster(mut self, file_name: &str, raster: Raster) -> Self {
        self.overrides.insert(file_name.to_string(), raster);
        self
    }

    /// Number of decode calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl PixelDecoder for MockDecoder {
    fn decode(&self, path: &Path) -> Result<Raster, DecodeError> {
        self.calls.set(self.calls.get() + 1);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.failing.contains(&name) {
            return Err(DecodeError::Codec {
                path: path.to_path_buf(),
                reason: "mock failure".to_string(),
            });
        }
        if let Some(raster) = self.overrides.get(&name) {
            return Ok(raster.clone());
        }
        Ok(Raster::filled(self.width, self.height, self.fill))
    }
}

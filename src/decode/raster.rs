//! Decoded image raster.

use image::{imageops::FilterType, RgbImage};

/// A decoded image as interleaved 8-bit RGB samples, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    /// Interleaved RGB samples.
    pixels: Vec<u8>,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
}

impl Raster {
    /// Number of interleaved samples per pixel.
    pub const CHANNELS: usize = 3;

    /// Creates a raster from interleaved RGB samples.
    pub fn from_rgb(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Creates a raster where every pixel has the same colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::CHANNELS)
            .collect();
        Self::from_rgb(pixels, width, height)
    }

    /// Returns the interleaved samples.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// True when the raster has no area or no sample data.
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0 || self.pixels.is_empty()
    }

    /// Validates that the sample buffer matches the dimensions.
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() == self.pixel_count() * Self::CHANNELS
    }

    /// Returns a copy scaled to `width` x `height`.
    ///
    /// Returns `None` if the sample buffer does not match the dimensions.
    pub fn resized(&self, width: u32, height: u32) -> Option<Self> {
        if self.dimensions() == (width, height) {
            return Some(self.clone());
        }
        let source = RgbImage::from_raw(self.width, self.height, self.pixels.clone())?;
        let scaled = image::imageops::resize(&source, width, height, FilterType::Triangle);
        Some(Self::from_rgb(scaled.into_raw(), width, height))
    }
}

impl From<RgbImage> for Raster {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_rgb(image.into_raw(), width, height)
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sample_bytes", &self.pixels.len())
            .finish()
    }
}

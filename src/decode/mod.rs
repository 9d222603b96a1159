//! Pixel decoding.
//!
//! Images are opened through the [`PixelDecoder`] trait so the
//! validator and the video assembler can run against synthetic
//! rasters in tests. [`ImageDecoder`] is the real implementation.

mod decoder;
mod raster;

pub use decoder::{DecodeError, ImageDecoder, MockDecoder, PixelDecoder};
pub use raster::Raster;

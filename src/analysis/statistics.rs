//! Pixel intensity statistics.

use crate::decode::Raster;

/// Mean and standard deviation of pixel intensities.
///
/// Both values are computed per channel and then averaged across
/// channels, so a frame that is uniform in each channel has zero
/// deviation even when the channels differ from each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStats {
    /// Average intensity (0-255).
    pub mean: f64,
    /// Average per-channel population standard deviation.
    pub stddev: f64,
}

/// Computes intensity statistics for a raster.
///
/// An empty raster yields all-zero statistics.
pub fn pixel_stats(raster: &Raster) -> PixelStats {
    let pixels = raster.pixels();
    let channels = Raster::CHANNELS;
    let count = pixels.len() / channels;
    if count == 0 {
        return PixelStats {
            mean: 0.0,
            stddev: 0.0,
        };
    }

    let n = count as f64;
    let mut sums = [0.0f64; Raster::CHANNELS];
    for px in pixels.chunks_exact(channels) {
        for (sum, &v) in sums.iter_mut().zip(px) {
            *sum += v as f64;
        }
    }
    let means = sums.map(|s| s / n);

    let mut squares = [0.0f64; Raster::CHANNELS];
    for px in pixels.chunks_exact(channels) {
        for ((sq, &v), mean) in squares.iter_mut().zip(px).zip(means) {
            *sq += (v as f64 - mean).powi(2);
        }
    }
    let stddevs = squares.map(|s| (s / n).sqrt());

    PixelStats {
        mean: means.iter().sum::<f64>() / channels as f64,
        stddev: stddevs.iter().sum::<f64>() / channels as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_frame_has_zero_deviation() {
        let raster = Raster::filled(10, 10, [20, 40, 60]);
        let stats = pixel_stats(&raster);

        assert!((stats.mean - 40.0).abs() < 1e-9);
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn test_checkerboard_deviation() {
        // Alternating black and white pixels: mean 127.5, stddev 127.5.
        let pixels: Vec<u8> = (0..16)
            .flat_map(|i| if i % 2 == 0 { [0u8; 3] } else { [255u8; 3] })
            .collect();
        let raster = Raster::from_rgb(pixels, 4, 4);
        let stats = pixel_stats(&raster);

        assert!((stats.mean - 127.5).abs() < 1e-9);
        assert!((stats.stddev - 127.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_raster() {
        let stats = pixel_stats(&Raster::from_rgb(Vec::new(), 0, 0));
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.stddev, 0.0);
    }
}

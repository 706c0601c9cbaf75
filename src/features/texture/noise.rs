//! Noise statistics
//!
//! Sensor noise leaves a moderate, irregular intensity spread in every small block of a
//! photograph. Rendered images tend to be cleaner.
//!
//! Algorithm:
//! 1. Tile the grayscale plane into 6×6 blocks (trailing partial blocks skipped)
//! 2. Standard deviation per block
//! 3. A block is "natural" when its std-dev is in (8, 60) and its variance exceeds 50
//! 4. Map the mean std-dev to a band, with a bonus when natural blocks are common

use crate::error::AnalysisError;
use crate::features::stats::{block_origins, mean_and_variance, ratio};
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::preprocessing::grayscale::GrayPlane;

/// Block edge length in pixels
pub const NOISE_BLOCK_SIZE: usize = 6;

/// Score when no block fits in the image
const NEUTRAL_SCORE: f64 = 0.4;

/// Noise statistics
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseStats {
    /// Blocks analyzed
    pub block_count: usize,
    /// Mean per-block standard deviation
    pub avg_noise_level: f64,
    /// Share of blocks with natural-looking noise
    pub natural_noise_ratio: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl NoiseStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.block_count == 0 {
            "Image smaller than one noise block"
        } else if self.avg_noise_level < 5.0 {
            "Very clean image (high quality or processed)"
        } else if self.avg_noise_level < 20.0 {
            "Moderate noise"
        } else {
            "Natural photographic noise"
        };

        FeatureResult::new(FeatureKind::Noise, self.score, interpretation)
            .with_metric("block_count", self.block_count as f64)
            .with_metric("avg_noise_level", self.avg_noise_level)
            .with_metric("natural_noise_ratio", self.natural_noise_ratio)
    }
}

/// Natural sensor noise: visible but not structural
fn is_natural_noise(std_dev: f64, variance: f64) -> bool {
    std_dev > 8.0 && std_dev < 60.0 && variance > 50.0
}

/// Band the mean std-dev, then add 0.3 (capped at 1.0) when natural blocks exceed 10%
fn noise_score(avg_noise_level: f64, natural_noise_ratio: f64) -> f64 {
    // Low noise alone is not evidence of generation: modern cameras denoise heavily
    let base = if avg_noise_level < 3.0 {
        0.3
    } else if avg_noise_level > 25.0 {
        0.9
    } else if avg_noise_level > 12.0 {
        0.7
    } else {
        0.4
    };

    if natural_noise_ratio > 0.1 {
        f64::min(base + 0.3, 1.0)
    } else {
        base
    }
}

/// Measure block noise
///
/// # Arguments
///
/// * `gray` - Grayscale plane
///
/// # Returns
///
/// Statistics with a score of 0.3 (mean std-dev < 3), 0.9 (> 25), 0.7 (> 12) or
/// 0.4 otherwise, plus 0.3 (capped at 1.0) when more than 10% of blocks look natural.
/// An image with no complete block scores 0.4.
pub fn analyze_noise(gray: &GrayPlane) -> NoiseStats {
    let mut total_level = 0.0;
    let mut natural_blocks = 0usize;
    let mut block_count = 0usize;
    let mut block = Vec::with_capacity(NOISE_BLOCK_SIZE * NOISE_BLOCK_SIZE);

    for y in block_origins(gray.height(), NOISE_BLOCK_SIZE, NOISE_BLOCK_SIZE) {
        for x in block_origins(gray.width(), NOISE_BLOCK_SIZE, NOISE_BLOCK_SIZE) {
            block.clear();
            for dy in 0..NOISE_BLOCK_SIZE {
                for dx in 0..NOISE_BLOCK_SIZE {
                    block.push(gray.get(x + dx, y + dy));
                }
            }

            let Some((_, variance)) = mean_and_variance(&block) else {
                continue;
            };
            let std_dev = variance.sqrt();

            total_level += std_dev;
            if is_natural_noise(std_dev, variance) {
                natural_blocks += 1;
            }
            block_count += 1;
        }
    }

    if block_count == 0 {
        log::warn!(
            "Image {}x{} smaller than one {}px noise block, using neutral score",
            gray.width(),
            gray.height(),
            NOISE_BLOCK_SIZE
        );
        return NoiseStats {
            block_count: 0,
            avg_noise_level: 0.0,
            natural_noise_ratio: 0.0,
            score: NEUTRAL_SCORE,
        };
    }

    let avg_noise_level = total_level / block_count as f64;
    let natural_noise_ratio = ratio(natural_blocks, block_count);

    let score = noise_score(avg_noise_level, natural_noise_ratio);

    log::debug!(
        "Noise: {} blocks, avg level={:.2}, natural ratio={:.3}, score={:.2}",
        block_count,
        avg_noise_level,
        natural_noise_ratio,
        score
    );

    NoiseStats {
        block_count,
        avg_noise_level,
        natural_noise_ratio,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_noise`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseExtractor;

impl FeatureExtractor for NoiseExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::Noise
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_noise(input.gray).to_feature_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::pixel_buffer::{PixelBuffer, Rgba};

    fn gray_plane<F: FnMut(usize, usize) -> u8>(w: usize, h: usize, mut f: F) -> GrayPlane {
        let buffer = PixelBuffer::from_fn(w, h, |x, y| {
            let v = f(x, y);
            Rgba::opaque(v, v, v)
        })
        .unwrap();
        GrayPlane::from_buffer(&buffer)
    }

    #[test]
    fn test_flat_image_is_clean() {
        let stats = analyze_noise(&gray_plane(100, 100, |_, _| 128));
        assert_eq!(stats.block_count, 16 * 16);
        assert_eq!(stats.avg_noise_level, 0.0);
        assert_eq!(stats.score, 0.3);
    }

    #[test]
    fn test_moderate_natural_noise_gets_bonus() {
        // Alternating 100 / 120: std-dev 10, variance 100 in every block
        let stats = analyze_noise(&gray_plane(60, 60, |x, y| if (x + y) % 2 == 0 { 100 } else { 120 }));
        assert!((stats.avg_noise_level - 10.0).abs() < 1e-9);
        assert_eq!(stats.natural_noise_ratio, 1.0);
        assert!((stats.score - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_structural_contrast_is_not_natural() {
        // Checkerboard 0 / 255: std-dev 127.5, outside the natural range
        let stats = analyze_noise(&gray_plane(60, 60, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 }));
        assert_eq!(stats.natural_noise_ratio, 0.0);
        assert_eq!(stats.score, 0.9);
    }

    #[test]
    fn test_sparse_contrast_without_bonus() {
        // One column of 0/255 checker blocks out of 9×9, flat elsewhere:
        // avg = 9 * 127.5 / 81 ≈ 14.2, and no block is natural
        let stats = analyze_noise(&gray_plane(60, 60, |x, y| {
            if x >= 6 {
                128
            } else if (x + y) % 2 == 0 {
                255
            } else {
                0
            }
        }));
        assert_eq!(stats.block_count, 81);
        assert!((stats.avg_noise_level - 127.5 / 9.0).abs() < 1e-9);
        assert_eq!(stats.natural_noise_ratio, 0.0);
        assert_eq!(stats.score, 0.7);
    }

    #[test]
    fn test_noise_score_bands() {
        let cases = [
            // (avg level, natural ratio, score)
            (2.9, 0.0, 0.3),
            (2.9, 0.11, 0.6),
            (3.0, 0.0, 0.4),
            (12.0, 0.0, 0.4),
            (12.0, 0.5, 0.7),
            (12.1, 0.0, 0.7),
            (25.0, 0.1, 0.7),
            (25.0, 0.11, 1.0),
            (25.1, 0.0, 0.9),
            (40.0, 0.5, 1.0),
        ];
        for (level, natural, expected) in cases {
            let score = noise_score(level, natural);
            assert!(
                (score - expected).abs() < 1e-12,
                "level={} natural={}: {}",
                level,
                natural,
                score
            );
        }
    }

    #[test]
    fn test_tiny_image_is_neutral() {
        let stats = analyze_noise(&gray_plane(4, 4, |x, _| (x * 60) as u8));
        assert_eq!(stats.block_count, 0);
        assert_eq!(stats.score, 0.4);
        assert!(stats.score.is_finite());
    }
}

//! Texture homogeneity
//!
//! Generated images often contain large regions that are smoother than any real
//! surface photographed through a lens. Only *extreme* smoothness counts; ordinary
//! out-of-focus areas stay below the threshold.

use crate::error::AnalysisError;
use crate::features::stats::{block_origins, mean_and_variance, ratio};
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::preprocessing::grayscale::GrayPlane;

/// Block edge length in pixels
pub const TEXTURE_BLOCK_SIZE: usize = 16;

/// Sampling stride inside a block
const SAMPLE_STRIDE: usize = 2;

/// Variance scale in `1 / (1 + variance / scale)`
const HOMOGENEITY_SCALE: f64 = 2000.0;

/// Texture homogeneity statistics
#[derive(Debug, Clone, PartialEq)]
pub struct HomogeneityStats {
    /// Blocks analyzed
    pub block_count: usize,
    /// Mean block homogeneity in (0, 1]
    pub avg_homogeneity: f64,
    /// Share of blocks with homogeneity > 0.92 and variance < 50
    pub extremely_smooth_ratio: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl HomogeneityStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.block_count == 0 {
            "Image smaller than one texture block"
        } else if self.extremely_smooth_ratio > 0.3 {
            "Extremely homogeneous textures (suspicious)"
        } else if self.extremely_smooth_ratio > 0.1 {
            "Some very smooth textures"
        } else {
            "Natural textures"
        };

        FeatureResult::new(FeatureKind::TextureHomogeneity, self.score, interpretation)
            .with_metric("block_count", self.block_count as f64)
            .with_metric("avg_homogeneity", self.avg_homogeneity)
            .with_metric("extremely_smooth_ratio", self.extremely_smooth_ratio)
    }
}

/// Measure texture homogeneity
///
/// # Arguments
///
/// * `gray` - Grayscale plane
///
/// # Returns
///
/// Statistics with a score of `min(ratio * 2, 1)` when more than 40% of blocks are
/// extremely smooth, otherwise `min(avg_homogeneity * ratio * 3, 0.5)`. An image with
/// no complete block scores 0.0.
pub fn analyze_texture_homogeneity(gray: &GrayPlane) -> HomogeneityStats {
    let mut total_homogeneity = 0.0;
    let mut extremely_smooth = 0usize;
    let mut block_count = 0usize;
    let mut samples = Vec::with_capacity((TEXTURE_BLOCK_SIZE / SAMPLE_STRIDE).pow(2));

    for y in block_origins(gray.height(), TEXTURE_BLOCK_SIZE, TEXTURE_BLOCK_SIZE) {
        for x in block_origins(gray.width(), TEXTURE_BLOCK_SIZE, TEXTURE_BLOCK_SIZE) {
            samples.clear();
            for dy in (0..TEXTURE_BLOCK_SIZE).step_by(SAMPLE_STRIDE) {
                for dx in (0..TEXTURE_BLOCK_SIZE).step_by(SAMPLE_STRIDE) {
                    if let Some(v) = gray.try_get(x + dx, y + dy) {
                        samples.push(v);
                    }
                }
            }

            let Some((_, variance)) = mean_and_variance(&samples) else {
                continue;
            };
            let homogeneity = 1.0 / (1.0 + variance / HOMOGENEITY_SCALE);

            total_homogeneity += homogeneity;
            if homogeneity > 0.92 && variance < 50.0 {
                extremely_smooth += 1;
            }
            block_count += 1;
        }
    }

    if block_count == 0 {
        log::warn!(
            "Image {}x{} smaller than one {}px texture block, using neutral score",
            gray.width(),
            gray.height(),
            TEXTURE_BLOCK_SIZE
        );
        return HomogeneityStats {
            block_count: 0,
            avg_homogeneity: 0.0,
            extremely_smooth_ratio: 0.0,
            score: 0.0,
        };
    }

    let avg_homogeneity = total_homogeneity / block_count as f64;
    let extremely_smooth_ratio = ratio(extremely_smooth, block_count);

    let score = if extremely_smooth_ratio > 0.4 {
        f64::min(extremely_smooth_ratio * 2.0, 1.0)
    } else {
        f64::min(avg_homogeneity * extremely_smooth_ratio * 3.0, 0.5)
    };

    log::debug!(
        "Texture: {} blocks, avg homogeneity={:.3}, extremely smooth={:.3}, score={:.3}",
        block_count,
        avg_homogeneity,
        extremely_smooth_ratio,
        score
    );

    HomogeneityStats {
        block_count,
        avg_homogeneity,
        extremely_smooth_ratio,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_texture_homogeneity`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureHomogeneityExtractor;

impl FeatureExtractor for TextureHomogeneityExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::TextureHomogeneity
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_texture_homogeneity(input.gray).to_feature_result())
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
    fn test_flat_image_is_fully_smooth() {
        let stats = analyze_texture_homogeneity(&gray_plane(100, 100, |_, _| 77));
        assert_eq!(stats.block_count, 36);
        assert_eq!(stats.avg_homogeneity, 1.0);
        assert_eq!(stats.extremely_smooth_ratio, 1.0);
        assert_eq!(stats.score, 1.0);
    }

    #[test]
    fn test_high_contrast_stripes_are_not_smooth() {
        // Two-pixel stripes survive the stride-2 sampling
        let stats = analyze_texture_homogeneity(&gray_plane(64, 64, |x, _| {
            if (x / 2) % 2 == 0 {
                0
            } else {
                255
            }
        }));
        assert_eq!(stats.extremely_smooth_ratio, 0.0);
        assert_eq!(stats.score, 0.0);
        assert!(stats.avg_homogeneity < 0.2);
    }

    #[test]
    fn test_partial_smoothness_is_capped() {
        // Left quarter flat, rest striped: 3 of 9 blocks smooth -> ratio 1/3
        let stats = analyze_texture_homogeneity(&gray_plane(64, 64, |x, _| {
            if x < 16 || (x / 2) % 2 == 0 {
                10
            } else {
                250
            }
        }));
        assert!((stats.extremely_smooth_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert!(stats.score <= 0.5);
        assert!(stats.score > 0.0);
    }

    #[test]
    fn test_tiny_image_is_neutral() {
        let stats = analyze_texture_homogeneity(&gray_plane(4, 4, |_, _| 0));
        assert_eq!(stats.block_count, 0);
        assert_eq!(stats.score, 0.0);
    }
}

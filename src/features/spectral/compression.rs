//! Compression artifacts
//!
//! JPEG encodes 8×8 blocks independently, so heavy compression leaves visible steps
//! along block boundaries. A block counts as "blocking" when the color jump across its
//! right boundary is large on more than 40% of the sampled rows.

use crate::error::AnalysisError;
use crate::features::stats::{block_origins, ratio};
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::io::pixel_buffer::PixelBuffer;

/// JPEG block edge length
pub const JPEG_BLOCK_SIZE: usize = 8;

/// Row sampling stride along the boundary
const ROW_STRIDE: usize = 2;

/// L1 RGB jump that counts as a discontinuity
const DISCONTINUITY_THRESHOLD: u32 = 40;

/// Share of `JPEG_BLOCK_SIZE` that discontinuities must exceed
const BLOCKING_FRACTION: f64 = 0.4;

/// Compression artifact statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStats {
    /// Blocks analyzed
    pub total_blocks: usize,
    /// Blocks with a discontinuous right boundary
    pub blocking_blocks: usize,
    /// Normalized score in [0, 1]; equals `blocking_blocks / total_blocks`
    pub score: f64,
}

impl CompressionStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.score > 0.2 {
            "Evident compression artifacts"
        } else if self.score > 0.05 {
            "Some artifacts detected"
        } else {
            "No significant artifacts"
        };

        FeatureResult::new(FeatureKind::CompressionArtifacts, self.score, interpretation)
            .with_metric("total_blocks", self.total_blocks as f64)
            .with_metric("blocking_blocks", self.blocking_blocks as f64)
            .with_metric("artifact_ratio", self.score)
    }
}

/// Whether the right boundary of the block at (x, y) is discontinuous
fn has_blocking(buffer: &PixelBuffer, x: usize, y: usize) -> bool {
    let inner = x + JPEG_BLOCK_SIZE - 1;
    let outer = x + JPEG_BLOCK_SIZE;

    let discontinuities = (0..JPEG_BLOCK_SIZE)
        .step_by(ROW_STRIDE)
        .filter_map(|dy| {
            let a = buffer.try_get(inner, y + dy)?;
            let b = buffer.try_get(outer, y + dy)?;
            Some(a.rgb_distance(&b))
        })
        .filter(|&diff| diff > DISCONTINUITY_THRESHOLD)
        .count();

    discontinuities as f64 > JPEG_BLOCK_SIZE as f64 * BLOCKING_FRACTION
}

/// Measure 8×8 blocking
///
/// # Arguments
///
/// * `buffer` - RGBA pixels
///
/// # Returns
///
/// Statistics whose score is the blocking share; 0.0 when no block fits
pub fn analyze_compression_artifacts(buffer: &PixelBuffer) -> CompressionStats {
    let mut total_blocks = 0usize;
    let mut blocking_blocks = 0usize;

    for y in block_origins(buffer.height(), JPEG_BLOCK_SIZE, JPEG_BLOCK_SIZE) {
        for x in block_origins(buffer.width(), JPEG_BLOCK_SIZE, JPEG_BLOCK_SIZE) {
            if has_blocking(buffer, x, y) {
                blocking_blocks += 1;
            }
            total_blocks += 1;
        }
    }

    if total_blocks == 0 {
        log::warn!(
            "Image {}x{} smaller than one {}px block, no compression analysis",
            buffer.width(),
            buffer.height(),
            JPEG_BLOCK_SIZE
        );
    }

    let score = ratio(blocking_blocks, total_blocks);
    log::debug!(
        "Compression: {}/{} blocking blocks, score={:.3}",
        blocking_blocks,
        total_blocks,
        score
    );

    CompressionStats {
        total_blocks,
        blocking_blocks,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_compression_artifacts`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionArtifactsExtractor;

impl FeatureExtractor for CompressionArtifactsExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::CompressionArtifacts
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_compression_artifacts(input.buffer).to_feature_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::pixel_buffer::Rgba;

    #[test]
    fn test_solid_image_has_no_blocking() {
        let buffer = PixelBuffer::filled(64, 64, Rgba::opaque(200, 10, 10)).unwrap();
        let stats = analyze_compression_artifacts(&buffer);
        assert_eq!(stats.total_blocks, 49);
        assert_eq!(stats.blocking_blocks, 0);
        assert_eq!(stats.score, 0.0);
    }

    #[test]
    fn test_block_aligned_bands_are_blocking() {
        let buffer = PixelBuffer::from_fn(64, 64, |x, _| {
            if (x / JPEG_BLOCK_SIZE) % 2 == 0 {
                Rgba::opaque(0, 0, 0)
            } else {
                Rgba::opaque(30, 30, 30)
            }
        })
        .unwrap();
        let stats = analyze_compression_artifacts(&buffer);
        assert_eq!(stats.blocking_blocks, stats.total_blocks);
        assert_eq!(stats.score, 1.0);
        assert_eq!(
            stats.to_feature_result().interpretation,
            "Evident compression artifacts"
        );
    }

    #[test]
    fn test_small_jumps_are_ignored() {
        // 13 levels per channel: L1 jump of 39 stays under the threshold
        let buffer = PixelBuffer::from_fn(64, 64, |x, _| {
            let v = if (x / JPEG_BLOCK_SIZE) % 2 == 0 { 0 } else { 13 };
            Rgba::opaque(v, v, v)
        })
        .unwrap();
        assert_eq!(analyze_compression_artifacts(&buffer).score, 0.0);
    }

    #[test]
    fn test_tiny_image_is_neutral() {
        let buffer = PixelBuffer::filled(4, 4, Rgba::opaque(0, 0, 0)).unwrap();
        let stats = analyze_compression_artifacts(&buffer);
        assert_eq!(stats.total_blocks, 0);
        assert_eq!(stats.score, 0.0);
    }
}

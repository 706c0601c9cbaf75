//! Pattern regularity
//!
//! Compares each 20px tile with its right-hand neighbour on a 40px grid. Generated
//! images repeat themselves at tile scale far more than camera output does.

use crate::error::AnalysisError;
use crate::features::stats::{block_origins, ratio};
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::io::pixel_buffer::{PixelBuffer, Rgba};

/// Tile edge length in pixels
pub const PATTERN_BLOCK_SIZE: usize = 20;

/// Sampling stride inside a tile
const SAMPLE_STRIDE: usize = 2;

/// Largest L1 RGB distance between two samples
const MAX_RGB_DISTANCE: f64 = 3.0 * 255.0;

const REGULAR_SIMILARITY: f64 = 0.85;
const VERY_REGULAR_SIMILARITY: f64 = 0.95;

/// Pattern regularity statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PatternStats {
    /// Tile pairs compared
    pub pair_count: usize,
    /// Pairs with similarity > 0.85
    pub regular_pairs: usize,
    /// Pairs with similarity > 0.95
    pub very_regular_pairs: usize,
    /// `regular_pairs / pair_count`
    pub regular_ratio: f64,
    /// `very_regular_pairs / pair_count`
    pub very_regular_ratio: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl PatternStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.very_regular_ratio > 0.3 {
            "Extremely regular patterns (artificial)"
        } else if self.regular_ratio > 0.3 {
            "Some regular patterns"
        } else {
            "Natural patterns"
        };

        FeatureResult::new(FeatureKind::PatternRegularity, self.score, interpretation)
            .with_metric("pair_count", self.pair_count as f64)
            .with_metric("regular_pairs", self.regular_pairs as f64)
            .with_metric("very_regular_pairs", self.very_regular_pairs as f64)
            .with_metric("regular_ratio", self.regular_ratio)
            .with_metric("very_regular_ratio", self.very_regular_ratio)
    }
}

/// Similarity in [0, 1] of two equally sized tiles, sampled every second row and column
///
/// Returns 0.0 when there is nothing to compare.
fn tile_similarity(left: &[Rgba], right: &[Rgba], size: usize) -> f64 {
    let mut total_diff = 0u64;
    let mut samples = 0usize;

    for dy in (0..size).step_by(SAMPLE_STRIDE) {
        for dx in (0..size).step_by(SAMPLE_STRIDE) {
            let idx = dy * size + dx;
            if let (Some(a), Some(b)) = (left.get(idx), right.get(idx)) {
                total_diff += a.rgb_distance(b) as u64;
                samples += 1;
            }
        }
    }

    if samples == 0 {
        return 0.0;
    }
    1.0 - total_diff as f64 / (samples as f64 * MAX_RGB_DISTANCE)
}

/// Map the regular and very-regular pair shares to a score
fn regularity_score(regular_ratio: f64, very_regular_ratio: f64) -> f64 {
    if very_regular_ratio > 0.6 {
        0.98
    } else if very_regular_ratio > 0.4 {
        0.92
    } else if very_regular_ratio > 0.2 {
        0.85
    } else if regular_ratio > 0.5 {
        0.7
    } else if regular_ratio > 0.3 {
        0.4
    } else if regular_ratio > 0.15 {
        0.2
    } else {
        0.05
    }
}

/// Measure tile-scale pattern regularity
///
/// # Arguments
///
/// * `buffer` - RGBA pixels
///
/// # Returns
///
/// Statistics scored from the very-regular share first (0.98 / 0.92 / 0.85 above
/// 60% / 40% / 20%), then the regular share (0.7 / 0.4 / 0.2 above 50% / 30% / 15%),
/// otherwise 0.05. An image too small for one pair scores 0.05.
pub fn analyze_pattern_regularity(buffer: &PixelBuffer) -> PatternStats {
    let grid = PATTERN_BLOCK_SIZE * 2;
    let mut pair_count = 0usize;
    let mut regular_pairs = 0usize;
    let mut very_regular_pairs = 0usize;

    for y in block_origins(buffer.height(), grid, grid) {
        for x in block_origins(buffer.width(), grid, grid) {
            let left = buffer.get_block(x, y, PATTERN_BLOCK_SIZE);
            let right = buffer.get_block(x + PATTERN_BLOCK_SIZE, y, PATTERN_BLOCK_SIZE);
            let similarity = tile_similarity(&left, &right, PATTERN_BLOCK_SIZE);

            pair_count += 1;
            if similarity > REGULAR_SIMILARITY {
                regular_pairs += 1;
            }
            if similarity > VERY_REGULAR_SIMILARITY {
                very_regular_pairs += 1;
            }
        }
    }

    if pair_count == 0 {
        log::warn!(
            "Image {}x{} too small for a {}px tile pair, using neutral score",
            buffer.width(),
            buffer.height(),
            PATTERN_BLOCK_SIZE
        );
    }

    let regular_ratio = ratio(regular_pairs, pair_count);
    let very_regular_ratio = ratio(very_regular_pairs, pair_count);

    let score = regularity_score(regular_ratio, very_regular_ratio);

    log::debug!(
        "Pattern: {} pairs, regular={:.3}, very regular={:.3}, score={:.2}",
        pair_count,
        regular_ratio,
        very_regular_ratio,
        score
    );

    PatternStats {
        pair_count,
        regular_pairs,
        very_regular_pairs,
        regular_ratio,
        very_regular_ratio,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_pattern_regularity`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRegularityExtractor;

impl FeatureExtractor for PatternRegularityExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::PatternRegularity
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_pattern_regularity(input.buffer).to_feature_result())
    }
}

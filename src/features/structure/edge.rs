//! Edge sharpness
//!
//! Sobel gradient magnitude on a sparse grid. Vector art and UI graphics have mostly
//! razor-sharp edges; lens blur and demosaicing leave photographs with soft or
//! moderate ones.
//!
//! Algorithm:
//! 1. Visit every third pixel, starting at (2, 2), keeping a 2px margin
//! 2. 3×3 Sobel magnitude on the grayscale plane
//! 3. Ignore magnitudes ≤ 8 (flat regions)
//! 4. Bucket the rest: sharp (> 60), moderate (> 25), soft

use crate::error::AnalysisError;
use crate::features::stats::ratio;
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::preprocessing::grayscale::GrayPlane;

/// Grid stride in pixels
const GRID_STRIDE: usize = 3;

/// Margin and first grid coordinate
const MARGIN: usize = 2;

/// Magnitudes at or below this are not edges
const MIN_EDGE_STRENGTH: f64 = 8.0;

const SHARP_EDGE_STRENGTH: f64 = 60.0;
const MODERATE_EDGE_STRENGTH: f64 = 25.0;

/// Edge sharpness statistics
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStats {
    /// Grid points whose magnitude exceeded the edge threshold
    pub edge_count: usize,
    /// Edges with magnitude > 60
    pub sharp_edges: usize,
    /// Edges with magnitude in (25, 60]
    pub moderate_edges: usize,
    /// Edges with magnitude in (8, 25]
    pub soft_edges: usize,
    /// Mean magnitude over counted edges
    pub avg_edge_strength: f64,
    /// `sharp_edges / edge_count`
    pub sharp_ratio: f64,
    /// `moderate_edges / edge_count`
    pub moderate_ratio: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl EdgeStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.sharp_ratio > 0.4 {
            "Very sharp edges"
        } else if self.sharp_ratio > 0.15 {
            "Moderate sharpness"
        } else {
            "Soft edges (photographic)"
        };

        FeatureResult::new(FeatureKind::EdgeSharpness, self.score, interpretation)
            .with_metric("edge_count", self.edge_count as f64)
            .with_metric("avg_edge_strength", self.avg_edge_strength)
            .with_metric("sharp_ratio", self.sharp_ratio)
            .with_metric("moderate_ratio", self.moderate_ratio)
            .with_metric("soft_edges", self.soft_edges as f64)
    }
}

/// 3×3 Sobel magnitude at (x, y); caller keeps (x, y) at least one pixel inside
#[inline]
fn sobel_magnitude(gray: &GrayPlane, x: usize, y: usize) -> f64 {
    let g = |px: usize, py: usize| gray.get(px, py);

    let gx = -g(x - 1, y - 1) + g(x + 1, y - 1) - 2.0 * g(x - 1, y) + 2.0 * g(x + 1, y)
        - g(x - 1, y + 1)
        + g(x + 1, y + 1);
    let gy = -g(x - 1, y - 1) - 2.0 * g(x, y - 1) - g(x + 1, y - 1)
        + g(x - 1, y + 1)
        + 2.0 * g(x, y + 1)
        + g(x + 1, y + 1);

    gx.hypot(gy)
}

fn sharpness_score(sharp_ratio: f64, moderate_ratio: f64) -> f64 {
    if sharp_ratio > 0.6 {
        0.9
    } else if sharp_ratio > 0.3 {
        0.6
    } else if moderate_ratio > 0.4 {
        0.4
    } else {
        0.2
    }
}

/// Measure edge sharpness
///
/// # Arguments
///
/// * `gray` - Grayscale plane
///
/// # Returns
///
/// Statistics with a score of 0.9 when more than 60% of edges are sharp, 0.6 above
/// 30%, 0.4 when more than 40% are moderate, otherwise 0.2. An image without edges
/// scores 0.2.
pub fn analyze_edge_sharpness(gray: &GrayPlane) -> EdgeStats {
    let mut total_strength = 0.0;
    let mut sharp_edges = 0usize;
    let mut moderate_edges = 0usize;
    let mut soft_edges = 0usize;

    let y_end = gray.height().saturating_sub(MARGIN);
    let x_end = gray.width().saturating_sub(MARGIN);

    for y in (MARGIN..y_end).step_by(GRID_STRIDE) {
        for x in (MARGIN..x_end).step_by(GRID_STRIDE) {
            let strength = sobel_magnitude(gray, x, y);
            if strength <= MIN_EDGE_STRENGTH {
                continue;
            }

            total_strength += strength;
            if strength > SHARP_EDGE_STRENGTH {
                sharp_edges += 1;
            } else if strength > MODERATE_EDGE_STRENGTH {
                moderate_edges += 1;
            } else {
                soft_edges += 1;
            }
        }
    }

    let edge_count = sharp_edges + moderate_edges + soft_edges;
    let avg_edge_strength = if edge_count > 0 {
        total_strength / edge_count as f64
    } else {
        0.0
    };
    let sharp_ratio = ratio(sharp_edges, edge_count);
    let moderate_ratio = ratio(moderate_edges, edge_count);

    let score = sharpness_score(sharp_ratio, moderate_ratio);

    log::debug!(
        "Edges: {} counted, avg strength={:.2}, sharp={:.3}, moderate={:.3}, score={:.1}",
        edge_count,
        avg_edge_strength,
        sharp_ratio,
        moderate_ratio,
        score
    );

    EdgeStats {
        edge_count,
        sharp_edges,
        moderate_edges,
        soft_edges,
        avg_edge_strength,
        sharp_ratio,
        moderate_ratio,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_edge_sharpness`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeSharpnessExtractor;

impl FeatureExtractor for EdgeSharpnessExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::EdgeSharpness
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_edge_sharpness(input.gray).to_feature_result())
    }
}

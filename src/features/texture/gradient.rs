//! Gradient artificiality
//!
//! Rendered gradients step by an almost constant amount per pixel; gradients in a
//! photograph wobble. The detector samples short horizontal and vertical gray
//! profiles around a sparse grid of points and measures how regular their
//! consecutive differences are.

use crate::error::AnalysisError;
use crate::features::stats::{mean_and_variance, ratio};
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::preprocessing::grayscale::GrayPlane;

/// Grid spacing is `min(width, height) / SPACING_DIVISOR`
const SPACING_DIVISOR: usize = 15;

/// Smoothness above which a gradient counts as artificial
const ARTIFICIAL_SMOOTHNESS: f64 = 0.96;

/// Smoothness above which a transition counts as perfect
const PERFECT_SMOOTHNESS: f64 = 0.98;

/// Profile direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Horizontal,
    Vertical,
}

/// Local gradient profile summary
#[derive(Debug, Clone, Copy, PartialEq)]
struct LocalGradient {
    is_gradient: bool,
    smoothness: f64,
}

impl LocalGradient {
    const NONE: Self = Self {
        is_gradient: false,
        smoothness: 0.0,
    };
}

/// Gradient statistics
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStats {
    /// Grid spacing in pixels (0 when the image is too small)
    pub spacing: usize,
    /// Grid points where either profile was a gradient
    pub gradient_count: usize,
    /// Share of gradients with smoothness > 0.96
    pub artificial_gradient_ratio: f64,
    /// Share of gradients with smoothness > 0.98
    pub perfect_transition_ratio: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl GradientStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.perfect_transition_ratio > 0.4 {
            "Gradients too perfect (highly suspicious)"
        } else if self.artificial_gradient_ratio > 0.4 {
            "Many artificial gradients"
        } else {
            "Natural gradients"
        };

        FeatureResult::new(FeatureKind::GradientArtificiality, self.score, interpretation)
            .with_metric("spacing", self.spacing as f64)
            .with_metric("gradient_count", self.gradient_count as f64)
            .with_metric("artificial_gradient_ratio", self.artificial_gradient_ratio)
            .with_metric("perfect_transition_ratio", self.perfect_transition_ratio)
    }
}

/// Gray profile through `(x, y)` over `[-spacing, spacing]`
fn local_gradient(gray: &GrayPlane, x: usize, y: usize, spacing: usize, direction: Direction) -> LocalGradient {
    let step = (spacing / 10).max(1);
    let reach = spacing as isize;
    let (cx, cy) = (x as isize, y as isize);

    let values: Vec<f64> = (-reach..=reach)
        .step_by(step)
        .filter_map(|d| match direction {
            Direction::Horizontal => gray.get_signed(cx + d, cy),
            Direction::Vertical => gray.get_signed(cx, cy + d),
        })
        .collect();

    if values.len() < 3 {
        return LocalGradient::NONE;
    }

    let diffs: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let Some((avg_diff, variance)) = mean_and_variance(&diffs) else {
        return LocalGradient::NONE;
    };
    let max_diff = diffs.iter().copied().fold(0.0, f64::max);

    let smoothness = if avg_diff > 0.0 {
        1.0 / (1.0 + variance.sqrt() / avg_diff)
    } else {
        0.0
    };

    LocalGradient {
        is_gradient: avg_diff > 3.0 && max_diff > 10.0,
        smoothness,
    }
}

/// Map the artificial and perfect-transition shares to a score
fn artificiality_score(artificial_ratio: f64, perfect_ratio: f64) -> f64 {
    if perfect_ratio > 0.4 {
        0.9
    } else if artificial_ratio > 0.5 {
        0.7
    } else if artificial_ratio > 0.2 {
        0.4
    } else {
        0.1
    }
}

/// Measure gradient artificiality
///
/// # Arguments
///
/// * `gray` - Grayscale plane
///
/// # Returns
///
/// Statistics with a score of 0.9 when more than 40% of detected gradients are
/// perfect transitions, 0.7 when more than half are artificial, 0.4 above 20%,
/// otherwise 0.1. Images smaller than 15 pixels on a side score 0.1.
pub fn analyze_gradient_artificiality(gray: &GrayPlane) -> GradientStats {
    let (width, height) = (gray.width(), gray.height());
    let spacing = width.min(height) / SPACING_DIVISOR;

    if spacing == 0 {
        log::warn!(
            "Image {}x{} too small for gradient sampling, using neutral score",
            width,
            height
        );
        return GradientStats {
            spacing,
            gradient_count: 0,
            artificial_gradient_ratio: 0.0,
            perfect_transition_ratio: 0.0,
            score: 0.1,
        };
    }

    let mut gradient_count = 0usize;
    let mut artificial = 0usize;
    let mut perfect = 0usize;

    for y in (spacing..height.saturating_sub(spacing)).step_by(spacing * 2) {
        for x in (spacing..width.saturating_sub(spacing)).step_by(spacing * 2) {
            let h = local_gradient(gray, x, y, spacing, Direction::Horizontal);
            let v = local_gradient(gray, x, y, spacing, Direction::Vertical);

            if !(h.is_gradient || v.is_gradient) {
                continue;
            }
            gradient_count += 1;

            let smoothest = h.smoothness.max(v.smoothness);
            if smoothest > ARTIFICIAL_SMOOTHNESS {
                artificial += 1;
            }
            if smoothest > PERFECT_SMOOTHNESS {
                perfect += 1;
            }
        }
    }

    let artificial_gradient_ratio = ratio(artificial, gradient_count);
    let perfect_transition_ratio = ratio(perfect, gradient_count);

    let score = artificiality_score(artificial_gradient_ratio, perfect_transition_ratio);

    log::debug!(
        "Gradient: spacing={}, {} gradients, artificial={:.3}, perfect={:.3}, score={:.1}",
        spacing,
        gradient_count,
        artificial_gradient_ratio,
        perfect_transition_ratio,
        score
    );

    GradientStats {
        spacing,
        gradient_count,
        artificial_gradient_ratio,
        perfect_transition_ratio,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_gradient_artificiality`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientArtificialityExtractor;

impl FeatureExtractor for GradientArtificialityExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::GradientArtificiality
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_gradient_artificiality(input.gray).to_feature_result())
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
    fn test_flat_image_has_no_gradients() {
        let stats = analyze_gradient_artificiality(&gray_plane(100, 100, |_, _| 50));
        assert_eq!(stats.spacing, 6);
        assert_eq!(stats.gradient_count, 0);
        assert_eq!(stats.score, 0.1);
    }

    #[test]
    fn test_perfect_ramp_is_artificial() {
        // Triangle wave: every horizontal step is exactly 12 gray levels
        let stats = analyze_gradient_artificiality(&gray_plane(45, 45, |x, _| {
            let phase = x % 12;
            (12 * phase.min(12 - phase)) as u8
        }));
        assert_eq!(stats.spacing, 3);
        assert!(stats.gradient_count > 0);
        assert_eq!(stats.perfect_transition_ratio, 1.0);
        assert_eq!(stats.score, 0.9);
    }

    #[test]
    fn test_irregular_steps_are_natural() {
        // Steps alternate between 4 and 40 levels: a gradient, but far from smooth
        let stats = analyze_gradient_artificiality(&gray_plane(45, 45, |x, _| {
            let pair = (x / 2) as u32 * 44;
            let value = if x % 2 == 0 { pair } else { pair + 4 };
            (value % 250) as u8
        }));
        assert!(stats.gradient_count > 0);
        assert!(stats.artificial_gradient_ratio < 0.2);
        assert_eq!(stats.score, 0.1);
    }

    #[test]
    fn test_artificiality_score_bands() {
        let cases = [
            // (artificial, perfect, score)
            (1.0, 0.41, 0.9),
            (1.0, 0.4, 0.7),
            (0.51, 0.0, 0.7),
            (0.5, 0.0, 0.4),
            (0.21, 0.0, 0.4),
            (0.2, 0.0, 0.1),
            (0.0, 0.0, 0.1),
        ];
        for (artificial, perfect, expected) in cases {
            assert_eq!(artificiality_score(artificial, perfect), expected);
        }
    }

    #[test]
    fn test_tiny_image_is_neutral() {
        let stats = analyze_gradient_artificiality(&gray_plane(4, 4, |x, _| (x * 40) as u8));
        assert_eq!(stats.spacing, 0);
        assert_eq!(stats.score, 0.1);
    }
}

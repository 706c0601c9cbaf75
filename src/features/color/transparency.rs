//! Transparency
//!
//! Camera output is always opaque; cut-out graphics and icons are not.

use crate::error::AnalysisError;
use crate::features::stats::ratio;
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::io::pixel_buffer::PixelBuffer;

/// Fully transparent share above which transparency is significant
const SIGNIFICANT_TRANSPARENCY: f64 = 0.1;

/// Transparency statistics
#[derive(Debug, Clone, PartialEq)]
pub struct TransparencyStats {
    /// Pixels with alpha == 0
    pub transparent_pixels: usize,
    /// Pixels with 0 < alpha < 255
    pub partial_pixels: usize,
    /// All pixels
    pub total_pixels: usize,
    /// `transparent_pixels / total_pixels`
    pub transparency_ratio: f64,
    /// `partial_pixels / total_pixels`
    pub partial_ratio: f64,
    /// `transparency_ratio > 0.1`
    pub has_significant_transparency: bool,
    /// Normalized score; equals `transparency_ratio`
    pub score: f64,
}

impl TransparencyStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = format!(
            "{:.1}% transparent pixels, {}",
            self.transparency_ratio * 100.0,
            if self.has_significant_transparency {
                "significant transparency"
            } else {
                "opaque image"
            }
        );

        FeatureResult::new(FeatureKind::Transparency, self.score, interpretation)
            .with_metric("transparent_pixels", self.transparent_pixels as f64)
            .with_metric("partial_pixels", self.partial_pixels as f64)
            .with_metric("transparency_ratio", self.transparency_ratio)
            .with_metric("partial_transparency_ratio", self.partial_ratio)
            .with_flag("has_significant_transparency", self.has_significant_transparency)
    }
}

/// Measure full and partial transparency
///
/// # Arguments
///
/// * `buffer` - RGBA pixels
///
/// # Returns
///
/// Statistics whose score is the fully transparent ratio
pub fn analyze_transparency(buffer: &PixelBuffer) -> TransparencyStats {
    let mut transparent_pixels = 0usize;
    let mut partial_pixels = 0usize;

    for px in buffer.pixels() {
        match px.a {
            0 => transparent_pixels += 1,
            255 => {}
            _ => partial_pixels += 1,
        }
    }

    let total_pixels = buffer.pixel_count();
    let transparency_ratio = ratio(transparent_pixels, total_pixels);
    let partial_ratio = ratio(partial_pixels, total_pixels);

    log::debug!(
        "Transparency: {:.3} full, {:.3} partial over {} pixels",
        transparency_ratio,
        partial_ratio,
        total_pixels
    );

    TransparencyStats {
        transparent_pixels,
        partial_pixels,
        total_pixels,
        transparency_ratio,
        partial_ratio,
        has_significant_transparency: transparency_ratio > SIGNIFICANT_TRANSPARENCY,
        score: transparency_ratio,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_transparency`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparencyExtractor;

impl FeatureExtractor for TransparencyExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::Transparency
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_transparency(input.buffer).to_feature_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::pixel_buffer::Rgba;

    #[test]
    fn test_opaque_image_scores_zero() {
        let buffer = PixelBuffer::filled(10, 10, Rgba::opaque(5, 5, 5)).unwrap();
        let stats = analyze_transparency(&buffer);
        assert_eq!(stats.score, 0.0);
        assert!(!stats.has_significant_transparency);
    }

    #[test]
    fn test_fully_transparent_image() {
        let buffer = PixelBuffer::filled(50, 50, Rgba::EMPTY).unwrap();
        let stats = analyze_transparency(&buffer);
        assert_eq!(stats.transparency_ratio, 1.0);
        assert_eq!(stats.score, 1.0);
        assert!(stats.has_significant_transparency);

        let result = stats.to_feature_result();
        assert_eq!(result.flag("has_significant_transparency"), Some(true));
    }

    #[test]
    fn test_partial_alpha_is_counted_separately() {
        let buffer = PixelBuffer::from_fn(10, 1, |x, _| match x {
            0 => Rgba::new(0, 0, 0, 0),
            1 | 2 => Rgba::new(0, 0, 0, 128),
            _ => Rgba::opaque(0, 0, 0),
        })
        .unwrap();
        let stats = analyze_transparency(&buffer);
        assert_eq!(stats.transparent_pixels, 1);
        assert_eq!(stats.partial_pixels, 2);
        assert!((stats.score - 0.1).abs() < 1e-12);
        // Exactly 10% is not "significant"
        assert!(!stats.has_significant_transparency);
    }
}

//! Color diversity
//!
//! Counts distinct colors after quantizing each channel to 6 bits (value / 4), over
//! pixels with non-zero alpha. Flat palettes (logos, UI art) land low, photographs
//! with thousands of distinct shades land high.

use crate::error::AnalysisError;
use crate::features::stats::ratio;
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::io::pixel_buffer::PixelBuffer;

/// Quantized colors per channel after dividing by 4
const LEVELS_PER_CHANNEL: usize = 64;

/// Fewer distinct colors than this (with enough samples) is a flat palette
const FLAT_PALETTE_MAX_COLORS: usize = 20;

/// Sample count needed before a tiny palette is trusted
const FLAT_PALETTE_MIN_SAMPLES: usize = 500;

/// Fewer distinct colors than this is a reduced palette
const REDUCED_PALETTE_MAX_COLORS: usize = 200;

/// More distinct colors than this is photographic
const RICH_PALETTE_MIN_COLORS: usize = 1000;

/// Color diversity statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDiversityStats {
    /// Distinct quantized colors among opaque pixels
    pub unique_colors: usize,
    /// Pixels with alpha > 0
    pub opaque_pixels: usize,
    /// `unique_colors / opaque_pixels` (0.0 with no opaque pixels)
    pub diversity_ratio: f64,
    /// Fewer than 50 colors over more than 1000 pixels
    pub has_limited_palette: bool,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl ColorDiversityStats {
    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.has_limited_palette {
            format!("{} unique colors, limited palette", self.unique_colors)
        } else {
            format!("{} unique colors, rich color diversity", self.unique_colors)
        };

        FeatureResult::new(FeatureKind::ColorDiversity, self.score, interpretation)
            .with_metric("unique_colors", self.unique_colors as f64)
            .with_metric("opaque_pixels", self.opaque_pixels as f64)
            .with_metric("diversity_ratio", self.diversity_ratio)
            .with_flag("has_limited_palette", self.has_limited_palette)
    }
}

/// Measure color diversity
///
/// # Arguments
///
/// * `buffer` - RGBA pixels
///
/// # Returns
///
/// Statistics with a score of:
/// - 0.1 for fewer than 20 colors over more than 500 opaque pixels
/// - 0.3 for fewer than 200 colors
/// - 0.9 for more than 1000 colors
/// - otherwise `min(ratio * 5000, 0.8)`
///
/// A fully transparent image has no opaque pixels and scores 0.3.
pub fn analyze_color_diversity(buffer: &PixelBuffer) -> ColorDiversityStats {
    let mut seen = vec![false; LEVELS_PER_CHANNEL * LEVELS_PER_CHANNEL * LEVELS_PER_CHANNEL];
    let mut unique_colors = 0usize;
    let mut opaque_pixels = 0usize;

    for px in buffer.pixels().filter(|px| px.a > 0) {
        opaque_pixels += 1;
        let key = ((px.r as usize >> 2) * LEVELS_PER_CHANNEL + (px.g as usize >> 2))
            * LEVELS_PER_CHANNEL
            + (px.b as usize >> 2);
        if !seen[key] {
            seen[key] = true;
            unique_colors += 1;
        }
    }

    let diversity_ratio = ratio(unique_colors, opaque_pixels);

    let score = if unique_colors < FLAT_PALETTE_MAX_COLORS && opaque_pixels > FLAT_PALETTE_MIN_SAMPLES
    {
        0.1
    } else if unique_colors < REDUCED_PALETTE_MAX_COLORS {
        0.3
    } else if unique_colors > RICH_PALETTE_MIN_COLORS {
        0.9
    } else {
        (diversity_ratio * 5000.0).min(0.8)
    };

    log::debug!(
        "Color diversity: {} unique colors over {} opaque pixels (ratio={:.4}), score={:.2}",
        unique_colors,
        opaque_pixels,
        diversity_ratio,
        score
    );

    ColorDiversityStats {
        unique_colors,
        opaque_pixels,
        diversity_ratio,
        has_limited_palette: unique_colors < 50 && opaque_pixels > 1000,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_color_diversity`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorDiversityExtractor;

impl FeatureExtractor for ColorDiversityExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::ColorDiversity
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_color_diversity(input.buffer).to_feature_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::pixel_buffer::Rgba;

    #[test]
    fn test_solid_color_is_flat_palette() {
        let buffer = PixelBuffer::filled(100, 100, Rgba::opaque(120, 80, 200)).unwrap();
        let stats = analyze_color_diversity(&buffer);
        assert_eq!(stats.unique_colors, 1);
        assert_eq!(stats.opaque_pixels, 10_000);
        assert!(stats.has_limited_palette);
        assert_eq!(stats.score, 0.1);
    }

    #[test]
    fn test_small_solid_image_is_reduced_palette() {
        // Too few samples to trust the flat-palette band
        let buffer = PixelBuffer::filled(10, 10, Rgba::opaque(1, 1, 1)).unwrap();
        assert_eq!(analyze_color_diversity(&buffer).score, 0.3);
    }

    #[test]
    fn test_quantization_merges_near_colors() {
        // 0..=3 all fall in the same bucket
        let buffer = PixelBuffer::from_fn(4, 1, |x, _| Rgba::opaque(x as u8, 0, 0)).unwrap();
        assert_eq!(analyze_color_diversity(&buffer).unique_colors, 1);
    }

    #[test]
    fn test_transparent_pixels_are_ignored() {
        let buffer = PixelBuffer::from_fn(30, 30, |x, y| {
            if x < 15 {
                Rgba::new((x * 8) as u8, (y * 8) as u8, 0, 0)
            } else {
                Rgba::opaque(10, 10, 10)
            }
        })
        .unwrap();
        let stats = analyze_color_diversity(&buffer);
        assert_eq!(stats.unique_colors, 1);
        assert_eq!(stats.opaque_pixels, 450);
    }

    #[test]
    fn test_fully_transparent_is_neutral() {
        let buffer = PixelBuffer::filled(20, 20, Rgba::EMPTY).unwrap();
        let stats = analyze_color_diversity(&buffer);
        assert_eq!(stats.opaque_pixels, 0);
        assert_eq!(stats.diversity_ratio, 0.0);
        assert_eq!(stats.score, 0.3);
    }

    #[test]
    fn test_rich_palette() {
        // 64 x 64 distinct quantized colors
        let buffer = PixelBuffer::from_fn(64, 64, |x, y| {
            Rgba::opaque((x * 4) as u8, (y * 4) as u8, 128)
        })
        .unwrap();
        let stats = analyze_color_diversity(&buffer);
        assert_eq!(stats.unique_colors, 4096);
        assert_eq!(stats.score, 0.9);
    }

    #[test]
    fn test_mid_palette_uses_ratio() {
        // 400 distinct colors over 160_000 pixels: ratio 0.0025 -> 12.5, capped at 0.8
        let buffer = PixelBuffer::from_fn(400, 400, |x, _| {
            Rgba::opaque(((x % 20) * 4) as u8, (((x / 20) % 20) * 4) as u8, 0)
        })
        .unwrap();
        let stats = analyze_color_diversity(&buffer);
        assert_eq!(stats.unique_colors, 400);
        assert_eq!(stats.score, 0.8);
    }
}

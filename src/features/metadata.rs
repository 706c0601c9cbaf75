//! Metadata signal
//!
//! Camera-likeness of the container metadata. Cameras write JPEG at odd sensor
//! resolutions with plenty of bytes per pixel; generators emit PNG at multiples of
//! 512. Evidence accumulates on a "real camera" side and an "artificial" side, and
//! the score is the real side's share.

use crate::error::AnalysisError;
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::io::metadata::{ImageFormat, ImageMetadata};

/// Side length multiple typical of generator output
const GENERATOR_SIDE_MULTIPLE: u32 = 512;

/// Score when no metadata was supplied
const NEUTRAL_SCORE: f64 = 0.5;

/// Metadata signal statistics
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataStats {
    /// Container format (`Unknown` when metadata was missing)
    pub format: ImageFormat,
    /// Whether metadata was supplied at all
    pub available: bool,
    /// Encoded bytes per declared pixel
    pub bytes_per_pixel: f64,
    /// Square with a side that is a multiple of 512
    pub is_perfect_square: bool,
    /// Both sides multiples of 512
    pub is_perfect_ratio: bool,
    /// Accumulated evidence for a camera
    pub real_camera_score: f64,
    /// Accumulated evidence for generation
    pub artificial_score: f64,
    /// Normalized score in [0, 1]; higher means more camera-like
    pub score: f64,
}

impl MetadataStats {
    /// Result for a missing metadata record
    fn unavailable() -> Self {
        Self {
            format: ImageFormat::Unknown,
            available: false,
            bytes_per_pixel: 0.0,
            is_perfect_square: false,
            is_perfect_ratio: false,
            real_camera_score: 0.0,
            artificial_score: 0.0,
            score: NEUTRAL_SCORE,
        }
    }

    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if !self.available {
            "Metadata unavailable"
        } else if self.score > 0.6 {
            "Metadata suggests a real camera"
        } else if self.score < 0.4 {
            "Metadata suggests artificial generation"
        } else {
            "Neutral metadata"
        };

        FeatureResult::new(FeatureKind::MetadataSignal, self.score, interpretation)
            .with_metric("bytes_per_pixel", self.bytes_per_pixel)
            .with_metric("real_camera_score", self.real_camera_score)
            .with_metric("artificial_score", self.artificial_score)
            .with_flag("is_perfect_square", self.is_perfect_square)
            .with_flag("is_perfect_ratio", self.is_perfect_ratio)
            .with_flag("available", self.available)
    }
}

/// Score container metadata
///
/// # Arguments
///
/// * `metadata` - Format, byte size and declared dimensions, if known
///
/// # Returns
///
/// Statistics whose score is `real / (real + artificial)`, or 0.5 when the metadata
/// is missing or neither side collected any evidence
pub fn analyze_metadata(metadata: Option<&ImageMetadata>) -> MetadataStats {
    let Some(meta) = metadata else {
        log::warn!("No image metadata supplied, metadata signal is neutral");
        return MetadataStats::unavailable();
    };

    let mut real = 0.0;
    let mut artificial = 0.0;

    match meta.format {
        ImageFormat::Jpeg => real += 0.3,
        ImageFormat::Png => artificial += 0.2,
        _ => {}
    }

    let (width, height) = (meta.width, meta.height);
    let is_perfect_square = width == height && width % GENERATOR_SIDE_MULTIPLE == 0;
    let is_perfect_ratio =
        width % GENERATOR_SIDE_MULTIPLE == 0 && height % GENERATOR_SIDE_MULTIPLE == 0;

    if is_perfect_square {
        artificial += 0.4;
    } else if is_perfect_ratio {
        artificial += 0.2;
    } else {
        real += 0.2;
    }

    let bytes_per_pixel = meta.bytes_per_pixel();
    match meta.format {
        ImageFormat::Jpeg if bytes_per_pixel > 2.0 => real += 0.3,
        ImageFormat::Jpeg if bytes_per_pixel < 0.5 => artificial += 0.2,
        ImageFormat::Png if bytes_per_pixel > 3.0 => real += 0.2,
        _ => {}
    }

    let total = real + artificial;
    let score = if total > 0.0 { real / total } else { NEUTRAL_SCORE };

    log::debug!(
        "Metadata: {} {} ({:.3} B/px), real={:.2}, artificial={:.2}, score={:.3}",
        meta.format,
        meta.dimensions(),
        bytes_per_pixel,
        real,
        artificial,
        score
    );

    MetadataStats {
        format: meta.format,
        available: true,
        bytes_per_pixel,
        is_perfect_square,
        is_perfect_ratio,
        real_camera_score: real,
        artificial_score: artificial,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_metadata`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataSignalExtractor;

impl FeatureExtractor for MetadataSignalExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::MetadataSignal
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_metadata(input.metadata).to_feature_result())
    }
}

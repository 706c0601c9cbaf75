//! # PixelCheck
//!
//! Heuristic image provenance analysis: classifies a decoded raster image as a real
//! photograph, AI-generated, or graphic design.
//!
//! ## Features
//!
//! - **Ten engineered statistics**: color diversity, transparency, noise, edge
//!   sharpness, pattern regularity, compression artifacts, texture homogeneity,
//!   frequency balance, gradient artificiality, and container metadata
//! - **Linear scorer**: fixed per-class weights with a stable softmax
//! - **Rule overrides**: ordered heuristic rules that correct the scorer and assign
//!   a confidence tier, with a trace of which rules fired
//! - **Parallel extraction**: extractors fan out over rayon with deterministic output
//! - **Cancellation**: newest-submission-wins via [`AnalysisGate`]
//!
//! ## Quick Start
//!
//! ```
//! use pixelcheck::{analyze_rgba, AnalysisConfig};
//!
//! // 100x100 opaque purple square
//! let data = [120u8, 80, 200, 255].repeat(100 * 100);
//!
//! let result = analyze_rgba(100, 100, data, None, AnalysisConfig::default())?;
//!
//! println!(
//!     "{} ({} confidence)",
//!     result.classification.label, result.classification.confidence
//! );
//! # Ok::<(), pixelcheck::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! RGBA buffer → Grayscale plane → 10 Feature Extractors → Feature Vector
//!             → Linear Scorer → Rule Overrides → Output
//! ```
//!
//! Decoding files is left to the caller; the demos use the `image` crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::cancel::{AnalysisGate, CancellationToken};
pub use analysis::classify;
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::result::{
    AnalysisResult, ClassScores, ClassificationResult, ConfidenceTier, ImageClass,
};
pub use analysis::rules::{RuleEngine, RuleId, RuleThresholds};
pub use analysis::scorer::{ClassWeights, LinearModel};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::{FeatureKind, FeatureResult, FeatureVector};
pub use io::{ImageFormat, ImageMetadata, PixelBuffer, Rgba};

use features::{extract_features, ExtractionInput};
use preprocessing::grayscale::GrayPlane;

/// Main analysis function
///
/// Analyzes a decoded RGBA image and returns the verdict, probabilities, rule trace
/// and all ten feature results.
///
/// # Arguments
///
/// * `buffer` - Decoded pixels; consumed and dropped once the feature vector is built
/// * `metadata` - Container format, file size and declared dimensions, if known
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisResult` containing the classification and per-feature details
///
/// # Errors
///
/// Returns `AnalysisError` if the configuration is invalid or a feature score is
/// not a finite value in [0, 1]
///
/// # Example
///
/// ```
/// use pixelcheck::{analyze_image, AnalysisConfig, ImageFormat, ImageMetadata, PixelBuffer, Rgba};
///
/// let buffer = PixelBuffer::filled(64, 64, Rgba::opaque(30, 30, 30))?;
/// let meta = ImageMetadata::new(ImageFormat::Png, 2_048, 64, 64);
/// let result = analyze_image(buffer, Some(&meta), AnalysisConfig::default())?;
/// assert_eq!(result.features.len(), 10);
/// # Ok::<(), pixelcheck::AnalysisError>(())
/// ```
pub fn analyze_image(
    buffer: PixelBuffer,
    metadata: Option<&ImageMetadata>,
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_image_with_cancellation(buffer, metadata, config, &CancellationToken::new())
}

/// [`analyze_image`] with a cancellation token
///
/// The token is checked before each extractor and again before scoring. Once it is
/// cancelled the analysis stops and all partial results are discarded.
///
/// # Errors
///
/// Returns `AnalysisError::Cancelled` if the token fires before the verdict is
/// computed, otherwise as [`analyze_image`]
pub fn analyze_image_with_cancellation(
    buffer: PixelBuffer,
    metadata: Option<&ImageMetadata>,
    config: AnalysisConfig,
    token: &CancellationToken,
) -> Result<AnalysisResult, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    let (width, height) = (buffer.width(), buffer.height());
    log::debug!(
        "Starting image analysis: {}x{} ({} pixels)",
        width,
        height,
        buffer.pixel_count()
    );

    config.validate()?;
    token.check()?;

    if let Some(meta) = metadata {
        if meta.width as usize != width || meta.height as usize != height {
            log::debug!(
                "Declared dimensions {} differ from decoded {}x{}",
                meta.dimensions(),
                width,
                height
            );
        }
    }

    // Feature extraction
    let gray = GrayPlane::from_buffer(&buffer);
    let input = ExtractionInput {
        buffer: &buffer,
        gray: &gray,
        metadata,
    };
    let features = extract_features(&input, config.parallel_extraction, token)?;
    let vector = FeatureVector::from_results(&features)?;

    // Pixels are no longer needed
    drop(gray);
    drop(buffer);

    // Scoring and rule overrides
    token.check()?;
    let classification = classify(&vector, &config.model, &config.rule_engine())?;

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Analysis complete in {:.1} ms: {} ({})",
        processing_time_ms,
        classification.label,
        classification.confidence
    );

    Ok(AnalysisResult {
        classification,
        features,
        metadata: AnalysisMetadata {
            width,
            height,
            processing_time_ms,
            parallel_extraction: config.parallel_extraction,
            image_metadata: metadata.cloned(),
            ..AnalysisMetadata::default()
        },
    })
}

/// Validate raw RGBA bytes and analyze them
///
/// # Arguments
///
/// * `width`, `height` - Image dimensions in pixels
/// * `data` - Row-major RGBA bytes, `width * height * 4` long
/// * `metadata` - Container metadata, if known
/// * `config` - Analysis configuration parameters
///
/// # Errors
///
/// Returns `AnalysisError::InvalidBuffer` for zero dimensions or a length mismatch,
/// otherwise as [`analyze_image`]
pub fn analyze_rgba(
    width: usize,
    height: usize,
    data: Vec<u8>,
    metadata: Option<&ImageMetadata>,
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let buffer = PixelBuffer::new(width, height, data)?;
    analyze_image(buffer, metadata, config)
}

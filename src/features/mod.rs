//! Feature extraction modules
//!
//! Ten independent, read-only extractors, each producing one normalized score:
//! - Color: diversity, transparency
//! - Texture: noise statistics, homogeneity, gradient artificiality
//! - Structure: edge sharpness, pattern regularity
//! - Spectral: compression artifacts, frequency domain
//! - Metadata signal (container format, dimensions, file density)
//!
//! Extractors never mutate the image and share no state, so [`extract_features`] can
//! run them on a rayon pool. Results always come back in [`FeatureKind::ALL`] order.

pub mod color;
pub mod metadata;
pub mod spectral;
pub(crate) mod stats;
pub mod structure;
pub mod texture;
pub mod vector;

pub use vector::{FeatureVector, FEATURE_COUNT};

use crate::analysis::cancel::CancellationToken;
use crate::error::AnalysisError;
use crate::io::metadata::ImageMetadata;
use crate::io::pixel_buffer::PixelBuffer;
use crate::preprocessing::grayscale::GrayPlane;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of one feature slot
///
/// Declaration order is the feature-vector order used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Distinct quantized colors among opaque pixels
    ColorDiversity,
    /// Share of fully transparent pixels
    Transparency,
    /// Local grayscale variation in 6×6 blocks
    Noise,
    /// Sobel edge strength distribution
    EdgeSharpness,
    /// Self-similarity of neighbouring 20px tiles
    PatternRegularity,
    /// 8×8 block-boundary discontinuities
    CompressionArtifacts,
    /// Share of extremely smooth 16×16 regions
    TextureHomogeneity,
    /// Low/high frequency energy balance of 8×8 DCT blocks
    FrequencyDomain,
    /// Smoothness of local intensity ramps
    GradientArtificiality,
    /// Camera-likeness of the container metadata
    MetadataSignal,
}

impl FeatureKind {
    /// All kinds in feature-vector order
    pub const ALL: [FeatureKind; FEATURE_COUNT] = [
        FeatureKind::ColorDiversity,
        FeatureKind::Transparency,
        FeatureKind::Noise,
        FeatureKind::EdgeSharpness,
        FeatureKind::PatternRegularity,
        FeatureKind::CompressionArtifacts,
        FeatureKind::TextureHomogeneity,
        FeatureKind::FrequencyDomain,
        FeatureKind::GradientArtificiality,
        FeatureKind::MetadataSignal,
    ];

    /// Slot index in the feature vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short machine name (e.g. "pattern", "metadata_real")
    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::ColorDiversity => "color",
            FeatureKind::Transparency => "transparency",
            FeatureKind::Noise => "noise",
            FeatureKind::EdgeSharpness => "edge",
            FeatureKind::PatternRegularity => "pattern",
            FeatureKind::CompressionArtifacts => "compression",
            FeatureKind::TextureHomogeneity => "texture",
            FeatureKind::FrequencyDomain => "frequency",
            FeatureKind::GradientArtificiality => "gradient",
            FeatureKind::MetadataSignal => "metadata_real",
        }
    }

    /// Human-readable title
    pub fn title(self) -> &'static str {
        match self {
            FeatureKind::ColorDiversity => "Color Diversity",
            FeatureKind::Transparency => "Transparency",
            FeatureKind::Noise => "Noise Statistics",
            FeatureKind::EdgeSharpness => "Edge Sharpness",
            FeatureKind::PatternRegularity => "Pattern Regularity",
            FeatureKind::CompressionArtifacts => "Compression Artifacts",
            FeatureKind::TextureHomogeneity => "Texture Homogeneity",
            FeatureKind::FrequencyDomain => "Frequency Domain",
            FeatureKind::GradientArtificiality => "Gradient Artificiality",
            FeatureKind::MetadataSignal => "Metadata Signal",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of one extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    /// Which feature this is
    pub kind: FeatureKind,

    /// Normalized score in [0, 1]
    pub score: f64,

    /// Raw statistics behind the score, by name
    pub metrics: BTreeMap<String, f64>,

    /// Short human-readable reading of the statistics
    pub interpretation: String,
}

impl FeatureResult {
    /// Create a result with no raw metrics
    pub fn new(kind: FeatureKind, score: f64, interpretation: impl Into<String>) -> Self {
        Self {
            kind,
            score,
            metrics: BTreeMap::new(),
            interpretation: interpretation.into(),
        }
    }

    /// Attach a raw metric
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    /// Attach a boolean flag as 0.0 / 1.0
    pub fn with_flag(self, name: &str, flag: bool) -> Self {
        self.with_metric(name, if flag { 1.0 } else { 0.0 })
    }

    /// Look up a raw metric
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Look up a boolean flag stored with [`FeatureResult::with_flag`]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.metric(name).map(|v| v != 0.0)
    }
}

/// Everything an extractor may read
///
/// All references are shared and immutable; extractors get no way to write back.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    /// Decoded RGBA pixels
    pub buffer: &'a PixelBuffer,
    /// Grayscale view of `buffer`
    pub gray: &'a GrayPlane,
    /// Container metadata, if the caller had any
    pub metadata: Option<&'a ImageMetadata>,
}

/// A single feature extractor
pub trait FeatureExtractor: Send + Sync {
    /// Slot this extractor fills
    fn kind(&self) -> FeatureKind;

    /// Compute the feature
    ///
    /// # Errors
    ///
    /// Any error aborts the whole analysis; there are no retries.
    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError>;
}

/// The ten standard extractors, in feature-vector order
pub fn default_extractors() -> Vec<Box<dyn FeatureExtractor>> {
    vec![
        Box::new(color::diversity::ColorDiversityExtractor),
        Box::new(color::transparency::TransparencyExtractor),
        Box::new(texture::noise::NoiseExtractor),
        Box::new(structure::edge::EdgeSharpnessExtractor),
        Box::new(structure::pattern::PatternRegularityExtractor),
        Box::new(spectral::compression::CompressionArtifactsExtractor),
        Box::new(texture::homogeneity::TextureHomogeneityExtractor),
        Box::new(spectral::frequency::FrequencyDomainExtractor),
        Box::new(texture::gradient::GradientArtificialityExtractor),
        Box::new(metadata::MetadataSignalExtractor),
    ]
}

/// Run all ten extractors over one image
///
/// # Arguments
///
/// * `input` - Buffer, grayscale plane and optional metadata
/// * `parallel` - Fan the extractors out over the rayon pool
/// * `token` - Checked before each extractor starts
///
/// # Returns
///
/// The ten results in [`FeatureKind::ALL`] order, regardless of `parallel`
///
/// # Errors
///
/// Returns `AnalysisError::Cancelled` if the token fires, or the first extractor
/// error. Results finished before the failure are dropped.
pub fn extract_features(
    input: &ExtractionInput<'_>,
    parallel: bool,
    token: &CancellationToken,
) -> Result<Vec<FeatureResult>, AnalysisError> {
    let extractors = default_extractors();
    log::debug!(
        "Extracting {} features from {}x{} image (parallel={})",
        extractors.len(),
        input.buffer.width(),
        input.buffer.height(),
        parallel
    );

    let run = |extractor: &Box<dyn FeatureExtractor>| -> Result<FeatureResult, AnalysisError> {
        token.check()?;
        let result = extractor.extract(input)?;
        log::debug!(
            "{}: score={:.3} ({})",
            result.kind.title(),
            result.score,
            result.interpretation
        );
        Ok(result)
    };

    let results: Vec<FeatureResult> = if parallel {
        extractors.par_iter().map(run).collect::<Result<_, _>>()?
    } else {
        extractors.iter().map(run).collect::<Result<_, _>>()?
    };

    // A cancellation landing during the last extractor still discards the run
    token.check()?;

    Ok(results)
}

//! Fixed-length feature vector consumed by the scorer

use super::{FeatureKind, FeatureResult};
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Number of features in the vector
pub const FEATURE_COUNT: usize = 10;

/// Ten normalized feature scores in [`FeatureKind::ALL`] order
///
/// Construction validates every slot: values are finite and in [0, 1]. A vector that
/// exists is always safe to score.
///
/// # Example
///
/// ```
/// use pixelcheck::features::{FeatureKind, FeatureVector};
///
/// let v = FeatureVector::new([0.1, 0.0, 0.3, 0.2, 0.98, 0.0, 1.0, 0.7, 0.1, 0.5])?;
/// assert_eq!(v.get(FeatureKind::PatternRegularity), 0.98);
/// assert!(FeatureVector::new([f64::NAN; 10]).is_err());
/// # Ok::<(), pixelcheck::AnalysisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 10]", into = "[f64; 10]")]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build a vector from raw scores
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::NumericalError` naming the first slot that is NaN,
    /// infinite, or outside [0, 1].
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, AnalysisError> {
        for (kind, &value) in FeatureKind::ALL.iter().zip(values.iter()) {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::NumericalError(format!(
                    "feature '{}' has invalid score {}",
                    kind.name(),
                    value
                )));
            }
        }
        Ok(Self { values })
    }

    /// Assemble a vector from extractor results
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` when the results are not exactly one per
    /// feature in [`FeatureKind::ALL`] order, or `NumericalError` for a bad score.
    pub fn from_results(results: &[FeatureResult]) -> Result<Self, AnalysisError> {
        if results.len() != FEATURE_COUNT {
            return Err(AnalysisError::InvalidInput(format!(
                "expected {} feature results, got {}",
                FEATURE_COUNT,
                results.len()
            )));
        }

        let mut values = [0.0; FEATURE_COUNT];
        for ((slot, expected), result) in values.iter_mut().zip(FeatureKind::ALL).zip(results) {
            if result.kind != expected {
                return Err(AnalysisError::InvalidInput(format!(
                    "feature result '{}' found in slot for '{}'",
                    result.kind, expected
                )));
            }
            *slot = result.score;
        }

        Self::new(values)
    }

    /// Score of one feature
    #[inline]
    pub fn get(&self, kind: FeatureKind) -> f64 {
        self.values[kind.index()]
    }

    /// Raw scores in feature order
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// `(kind, score)` pairs in feature order
    pub fn iter_named(&self) -> impl Iterator<Item = (FeatureKind, f64)> + '_ {
        FeatureKind::ALL.iter().copied().zip(self.values.iter().copied())
    }

    /// Color diversity
    pub fn color(&self) -> f64 {
        self.get(FeatureKind::ColorDiversity)
    }

    /// Transparency ratio
    pub fn transparency(&self) -> f64 {
        self.get(FeatureKind::Transparency)
    }

    /// Noise statistics
    pub fn noise(&self) -> f64 {
        self.get(FeatureKind::Noise)
    }

    /// Edge sharpness
    pub fn edge(&self) -> f64 {
        self.get(FeatureKind::EdgeSharpness)
    }

    /// Pattern regularity
    pub fn pattern(&self) -> f64 {
        self.get(FeatureKind::PatternRegularity)
    }

    /// Compression artifacts
    pub fn compression(&self) -> f64 {
        self.get(FeatureKind::CompressionArtifacts)
    }

    /// Texture homogeneity
    pub fn texture(&self) -> f64 {
        self.get(FeatureKind::TextureHomogeneity)
    }

    /// Frequency domain
    pub fn frequency(&self) -> f64 {
        self.get(FeatureKind::FrequencyDomain)
    }

    /// Gradient artificiality
    pub fn gradient(&self) -> f64 {
        self.get(FeatureKind::GradientArtificiality)
    }

    /// Metadata camera-likeness
    pub fn metadata_real(&self) -> f64 {
        self.get(FeatureKind::MetadataSignal)
    }
}

impl TryFrom<[f64; FEATURE_COUNT]> for FeatureVector {
    type Error = AnalysisError;

    fn try_from(values: [f64; FEATURE_COUNT]) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<FeatureVector> for [f64; FEATURE_COUNT] {
    fn from(vector: FeatureVector) -> Self {
        vector.values
    }
}

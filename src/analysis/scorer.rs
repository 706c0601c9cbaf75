//! Linear scorer
//!
//! Three fixed linear models (one per class) over the feature vector, turned into
//! probabilities with a numerically stable softmax. The weights are hand-tuned
//! constants; there is no training path.
//!
//! # Example
//!
//! ```
//! use pixelcheck::analysis::scorer::LinearModel;
//! use pixelcheck::analysis::result::ImageClass;
//! use pixelcheck::features::FeatureVector;
//!
//! let features = FeatureVector::new([0.1, 0.0, 0.3, 0.2, 0.98, 0.0, 1.0, 0.7, 0.1, 0.5])?;
//! let prediction = LinearModel::default().predict(&features);
//!
//! assert_eq!(prediction.label, ImageClass::AiGenerated);
//! assert!((prediction.probabilities.sum() - 1.0).abs() < 1e-9);
//! # Ok::<(), pixelcheck::AnalysisError>(())
//! ```

use super::result::{ClassScores, ImageClass};
use crate::error::AnalysisError;
use crate::features::{FeatureKind, FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Weight vector and bias for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    /// One weight per feature, in feature order
    pub weights: [f64; FEATURE_COUNT],
    /// Constant term
    pub bias: f64,
}

impl ClassWeights {
    /// Create a weight table
    pub const fn new(weights: [f64; FEATURE_COUNT], bias: f64) -> Self {
        Self { weights, bias }
    }

    /// `Σ feature_i × weight_i + bias`
    pub fn score(&self, features: &FeatureVector) -> f64 {
        features
            .as_array()
            .iter()
            .zip(self.weights.iter())
            .map(|(f, w)| f * w)
            .sum::<f64>()
            + self.bias
    }

    fn validate(&self, class: ImageClass) -> Result<(), AnalysisError> {
        if let Some(kind) = FeatureKind::ALL
            .iter()
            .zip(self.weights.iter())
            .find(|(_, w)| !w.is_finite())
            .map(|(k, _)| k)
        {
            return Err(AnalysisError::InvalidInput(format!(
                "{} weight for '{}' is not finite",
                class,
                kind.name()
            )));
        }
        if !self.bias.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "{} bias is not finite",
                class
            )));
        }
        Ok(())
    }
}

/// Per-class weight tables
///
/// The defaults lean towards "real": the real bias is strongly positive and the AI
/// bias strongly negative, so a verdict of AI needs clear evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Real photograph
    pub real: ClassWeights,
    /// AI-generated
    pub ai_generated: ClassWeights,
    /// Graphic design
    pub graphic_design: ClassWeights,
}

impl Default for LinearModel {
    fn default() -> Self {
        // color, transparency, noise, edge, pattern, compression, texture, frequency, gradient, metadata
        Self {
            real: ClassWeights::new([0.6, -0.9, 0.8, -0.4, -1.2, 0.4, -0.9, -0.7, -0.8, 1.0], 0.8),
            ai_generated: ClassWeights::new(
                [-0.2, -0.3, -0.8, 0.3, 1.8, -0.4, 1.2, 1.0, 1.1, -0.8],
                -1.5,
            ),
            graphic_design: ClassWeights::new(
                [-0.9, 1.0, -1.0, 1.0, 0.6, -0.9, 0.2, 0.1, 0.3, 0.1],
                -0.3,
            ),
        }
    }
}

/// Scorer output before any rule runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Linear scores
    pub raw_scores: ClassScores,
    /// Softmax of `raw_scores`
    pub probabilities: ClassScores,
    /// Argmax class
    pub label: ImageClass,
    /// Probability of `label`
    pub max_probability: f64,
}

impl LinearModel {
    /// Weight table for one class
    pub fn weights_for(&self, class: ImageClass) -> &ClassWeights {
        match class {
            ImageClass::Real => &self.real,
            ImageClass::AiGenerated => &self.ai_generated,
            ImageClass::GraphicDesign => &self.graphic_design,
        }
    }

    /// Check that every weight and bias is finite
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` naming the first bad entry
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for class in ImageClass::ALL {
            self.weights_for(class).validate(class)?;
        }
        Ok(())
    }

    /// Linear score for every class
    pub fn raw_scores(&self, features: &FeatureVector) -> ClassScores {
        ClassScores::from_array(ImageClass::ALL.map(|class| self.weights_for(class).score(features)))
    }

    /// Score, normalize and pick the provisional label
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let raw_scores = self.raw_scores(features);
        let probabilities = ClassScores::from_array(softmax(raw_scores.to_array()));
        let (label, max_probability) = probabilities.argmax();

        log::debug!(
            "Scorer: raw=[{:.3}, {:.3}, {:.3}] p=[{:.3}, {:.3}, {:.3}] -> {} ({:.3})",
            raw_scores.real,
            raw_scores.ai_generated,
            raw_scores.graphic_design,
            probabilities.real,
            probabilities.ai_generated,
            probabilities.graphic_design,
            label,
            max_probability
        );

        Prediction {
            raw_scores,
            probabilities,
            label,
            max_probability,
        }
    }
}

/// Softmax with max subtraction
///
/// Subtracting the maximum keeps every exponent ≤ 0, so large scores cannot
/// overflow. Finite inputs always give finite outputs summing to 1.
pub fn softmax<const N: usize>(values: [f64; N]) -> [f64; N] {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = values.map(|v| (v - max).exp());
    let sum: f64 = exps.iter().sum();
    exps.map(|e| e / sum)
}

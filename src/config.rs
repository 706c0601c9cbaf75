//! Configuration parameters for image analysis

use crate::analysis::rules::{RuleEngine, RuleThresholds};
use crate::analysis::scorer::LinearModel;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Analysis configuration parameters
///
/// Serializable so a retuned model or threshold table can be loaded from JSON. Missing
/// fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Extraction
    /// Run the ten extractors on the rayon pool (default: true)
    /// Results are identical to sequential extraction
    pub parallel_extraction: bool,

    // Scoring
    /// Per-class weight tables (default: the hand-tuned tables)
    pub model: LinearModel,

    // Rule overrides
    /// Thresholds for the override rules (default: the hand-tuned thresholds)
    pub rule_thresholds: RuleThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel_extraction: true,
            model: LinearModel::default(),
            rule_thresholds: RuleThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Check that the model and thresholds are usable
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for any non-finite weight, bias or
    /// threshold
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.model.validate()?;
        self.rule_thresholds.validate()
    }

    /// Rule engine with the default order and these thresholds
    pub fn rule_engine(&self) -> RuleEngine {
        RuleEngine::new(self.rule_thresholds.clone())
    }
}

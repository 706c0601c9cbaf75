//! Classification and result aggregation modules
//!
//! Turns a feature vector into a verdict:
//! - Linear scoring and softmax
//! - Rule-based overrides and confidence tiers
//! - Cancellation
//! - Result types and metadata

pub mod cancel;
pub mod metadata;
pub mod result;
pub mod rules;
pub mod scorer;

use crate::error::AnalysisError;
use crate::features::FeatureVector;
use result::ClassificationResult;
use rules::RuleEngine;
use scorer::LinearModel;

/// Score a feature vector and correct the verdict with the rule engine
///
/// # Arguments
///
/// * `features` - Validated feature vector
/// * `model` - Per-class weight tables
/// * `engine` - Ordered override rules and their thresholds
///
/// # Returns
///
/// Final label, confidence tier, probabilities and the rule trace
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the model or thresholds contain
/// non-finite values, or `NumericalError` if scoring produced NaN.
///
/// # Example
///
/// ```
/// use pixelcheck::analysis::classify;
/// use pixelcheck::analysis::result::{ConfidenceTier, ImageClass};
/// use pixelcheck::analysis::rules::RuleEngine;
/// use pixelcheck::analysis::scorer::LinearModel;
/// use pixelcheck::features::FeatureVector;
///
/// let features = FeatureVector::new([0.5, 0.0, 0.2, 0.1, 0.98, 0.3, 0.7, 0.7, 0.8, 0.2])?;
/// let result = classify(&features, &LinearModel::default(), &RuleEngine::default())?;
///
/// assert_eq!(result.label, ImageClass::AiGenerated);
/// assert_eq!(result.confidence, ConfidenceTier::High);
/// # Ok::<(), pixelcheck::AnalysisError>(())
/// ```
pub fn classify(
    features: &FeatureVector,
    model: &LinearModel,
    engine: &RuleEngine,
) -> Result<ClassificationResult, AnalysisError> {
    model.validate()?;
    engine.thresholds().validate()?;

    let prediction = model.predict(features);
    if !prediction.max_probability.is_finite() {
        return Err(AnalysisError::NumericalError(
            "scorer produced a non-finite probability".to_string(),
        ));
    }

    let outcome = engine.evaluate(features, prediction.label, prediction.max_probability);

    log::debug!(
        "Classification: {} ({}), provisional {}, fired {:?}",
        outcome.verdict.label,
        outcome.verdict.confidence,
        prediction.label,
        outcome.fired
    );

    Ok(ClassificationResult {
        label: outcome.verdict.label,
        confidence: outcome.verdict.confidence,
        probabilities: prediction.probabilities,
        raw_scores: prediction.raw_scores,
        provisional_label: prediction.label,
        max_probability: prediction.max_probability,
        features: *features,
        indicators: outcome.counts,
        fired_rules: outcome.fired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use result::{ConfidenceTier, ImageClass};
    use rules::RuleId;

    #[test]
    fn test_classify_uniform_image_reference() {
        let features =
            FeatureVector::new([0.1, 0.0, 0.3, 0.2, 0.98, 0.0, 1.0, 0.7, 0.1, 0.5]).unwrap();
        let result = classify(&features, &LinearModel::default(), &RuleEngine::default()).unwrap();

        assert_eq!(result.label, ImageClass::AiGenerated);
        assert_eq!(result.confidence, ConfidenceTier::High);
        assert_eq!(result.provisional_label, ImageClass::AiGenerated);
        assert_eq!(result.fired_rules, vec![RuleId::AiSignature]);
        assert!((result.max_probability - 0.7384).abs() < 1e-3);
        assert!((result.probabilities.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_classify_low_confidence_defaults_to_real() {
        let features = FeatureVector::new([0.5; 10]).unwrap();
        let result = classify(&features, &LinearModel::default(), &RuleEngine::default()).unwrap();

        assert!(result.max_probability < 0.6);
        assert_eq!(result.label, ImageClass::Real);
        assert_eq!(result.confidence, ConfidenceTier::Low);
        assert_eq!(result.fired_rules.last(), Some(&RuleId::ConfidenceFloor));
    }

    #[test]
    fn test_classify_rejects_bad_model() {
        let features = FeatureVector::new([0.5; 10]).unwrap();
        let mut model = LinearModel::default();
        model.ai_generated.bias = f64::NAN;
        assert!(matches!(
            classify(&features, &model, &RuleEngine::default()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}

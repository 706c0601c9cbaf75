//! Analysis result types

use super::metadata::AnalysisMetadata;
use super::rules::{IndicatorCounts, RuleId};
use crate::features::{FeatureKind, FeatureResult, FeatureVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageClass {
    /// Camera photograph
    Real,
    /// Output of an image generator
    AiGenerated,
    /// Illustration, logo, UI art or other designed graphic
    GraphicDesign,
}

impl ImageClass {
    /// All classes in scoring order; argmax ties resolve to the earlier class
    pub const ALL: [ImageClass; 3] = [
        ImageClass::Real,
        ImageClass::AiGenerated,
        ImageClass::GraphicDesign,
    ];

    /// Position in [`ImageClass::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label as reported to users
    ///
    /// # Example
    ///
    /// ```
    /// use pixelcheck::analysis::result::ImageClass;
    ///
    /// assert_eq!(ImageClass::Real.as_str(), "real");
    /// assert_eq!(ImageClass::AiGenerated.as_str(), "ai-generated");
    /// assert_eq!(ImageClass::GraphicDesign.as_str(), "graphic-design");
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            ImageClass::Real => "real",
            ImageClass::AiGenerated => "ai-generated",
            ImageClass::GraphicDesign => "graphic-design",
        }
    }
}

impl fmt::Display for ImageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence tier summarizing how much rule support the label has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Scorer output with no rule support, or a weak scorer
    Low,
    /// Some supporting rule evidence
    Medium,
    /// Strong supporting rule evidence
    High,
}

impl ConfidenceTier {
    /// Lowercase tier name
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per class (raw scores or probabilities)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassScores {
    /// Real photograph
    pub real: f64,
    /// AI-generated
    pub ai_generated: f64,
    /// Graphic design
    pub graphic_design: f64,
}

impl ClassScores {
    /// Build from values in [`ImageClass::ALL`] order
    pub fn from_array(values: [f64; 3]) -> Self {
        Self {
            real: values[0],
            ai_generated: values[1],
            graphic_design: values[2],
        }
    }

    /// Values in [`ImageClass::ALL`] order
    pub fn to_array(&self) -> [f64; 3] {
        [self.real, self.ai_generated, self.graphic_design]
    }

    /// Value for one class
    pub fn get(&self, class: ImageClass) -> f64 {
        match class {
            ImageClass::Real => self.real,
            ImageClass::AiGenerated => self.ai_generated,
            ImageClass::GraphicDesign => self.graphic_design,
        }
    }

    /// Sum over classes
    pub fn sum(&self) -> f64 {
        self.real + self.ai_generated + self.graphic_design
    }

    /// Class with the largest value and that value
    ///
    /// Ties resolve to the first class in [`ImageClass::ALL`] order.
    pub fn argmax(&self) -> (ImageClass, f64) {
        let mut best = (ImageClass::Real, self.real);
        for class in [ImageClass::AiGenerated, ImageClass::GraphicDesign] {
            let value = self.get(class);
            if value > best.1 {
                best = (class, value);
            }
        }
        best
    }
}

/// Scorer output corrected by the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Final label
    pub label: ImageClass,

    /// Confidence tier of the final label
    pub confidence: ConfidenceTier,

    /// Softmax probabilities; sum to 1
    pub probabilities: ClassScores,

    /// Linear scores before softmax
    pub raw_scores: ClassScores,

    /// Scorer argmax before any rule ran
    pub provisional_label: ImageClass,

    /// Largest probability
    pub max_probability: f64,

    /// Scored features
    pub features: FeatureVector,

    /// Indicator counts the rules evaluated
    pub indicators: IndicatorCounts,

    /// Rules that overrode the verdict, in evaluation order
    pub fired_rules: Vec<RuleId>,
}

impl ClassificationResult {
    /// Whether any rule changed the scorer's verdict
    pub fn was_overridden(&self) -> bool {
        !self.fired_rules.is_empty()
    }
}

/// Complete analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Verdict, probabilities and rule trace
    pub classification: ClassificationResult,

    /// The ten extractor outputs in feature order
    pub features: Vec<FeatureResult>,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Final label
    pub fn label(&self) -> ImageClass {
        self.classification.label
    }

    /// Final confidence tier
    pub fn confidence(&self) -> ConfidenceTier {
        self.classification.confidence
    }

    /// Extractor output for one feature
    pub fn feature(&self, kind: FeatureKind) -> Option<&FeatureResult> {
        self.features.iter().find(|f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_labels() {
        let labels: Vec<&str> = ImageClass::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels, vec!["real", "ai-generated", "graphic-design"]);
        assert_eq!(ImageClass::GraphicDesign.index(), 2);
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&ImageClass::AiGenerated).unwrap(),
            "\"ai-generated\""
        );
        assert_eq!(
            serde_json::to_string(&ConfidenceTier::High).unwrap(),
            "\"high\""
        );
    }

    #[test]
    fn test_argmax_tie_prefers_earlier_class() {
        let tied = ClassScores::from_array([0.2, 0.4, 0.4]);
        assert_eq!(tied.argmax(), (ImageClass::AiGenerated, 0.4));

        let all_equal = ClassScores::from_array([1.0 / 3.0; 3]);
        assert_eq!(all_equal.argmax().0, ImageClass::Real);

        let graphic = ClassScores::from_array([0.1, 0.2, 0.7]);
        assert_eq!(graphic.argmax().0, ImageClass::GraphicDesign);
    }

    #[test]
    fn test_class_scores_accessors() {
        let scores = ClassScores::from_array([0.1, 0.6, 0.3]);
        assert_eq!(scores.get(ImageClass::AiGenerated), 0.6);
        assert_eq!(scores.to_array(), [0.1, 0.6, 0.3]);
        assert!((scores.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_order() {
        assert!(ConfidenceTier::Low < ConfidenceTier::Medium);
        assert!(ConfidenceTier::Medium < ConfidenceTier::High);
    }
}

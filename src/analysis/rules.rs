//! Rule override engine
//!
//! The linear scorer alone over-reports AI generation. The rule engine corrects its
//! verdict with an ordered list of heuristic rules. Every rule is a pure function of
//! the feature snapshot and the verdict so far; an applicable rule replaces the
//! verdict, so the last applicable rule wins. The starting verdict is the scorer's
//! argmax with `low` confidence.
//!
//! Default order:
//! 1. AI signature: very regular patterns with soft edges, plus supporting evidence
//! 2. Extreme indicators: at least three extreme AI indicators
//! 3. Real camera: camera-like metadata on an opaque, irregular image
//! 4. Strong real: at least three photographic indicators
//! 5. Graphic design: at least three graphic indicators
//! 6. Anti-false-positive: an AI verdict without enough indicators becomes real
//! 7. Low regularity: irregular, textured, colorful images are real
//! 8. Confidence floor: a weak scorer defaults to real

use super::result::{ConfidenceTier, ImageClass};
use crate::error::AnalysisError;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one override rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    /// Regular patterns + soft edges + supporting AI indicators
    AiSignature,
    /// Three or more extreme AI indicators
    ExtremeIndicators,
    /// Camera metadata on an opaque, irregular image
    RealCamera,
    /// Three or more photographic indicators
    StrongReal,
    /// Three or more graphic-design indicators
    GraphicDesign,
    /// AI verdict without enough AI indicators
    AntiFalsePositive,
    /// Irregular, non-homogeneous, colorful image
    LowRegularity,
    /// Scorer too unsure to trust
    ConfidenceFloor,
}

impl RuleId {
    /// Default evaluation order
    pub const DEFAULT_ORDER: [RuleId; 8] = [
        RuleId::AiSignature,
        RuleId::ExtremeIndicators,
        RuleId::RealCamera,
        RuleId::StrongReal,
        RuleId::GraphicDesign,
        RuleId::AntiFalsePositive,
        RuleId::LowRegularity,
        RuleId::ConfidenceFloor,
    ];

    /// Kebab-case rule name
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::AiSignature => "ai-signature",
            RuleId::ExtremeIndicators => "extreme-indicators",
            RuleId::RealCamera => "real-camera",
            RuleId::StrongReal => "strong-real",
            RuleId::GraphicDesign => "graphic-design",
            RuleId::AntiFalsePositive => "anti-false-positive",
            RuleId::LowRegularity => "low-regularity",
            RuleId::ConfidenceFloor => "confidence-floor",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule thresholds
///
/// Comparisons are strict unless the field name ends in `_min` (≥) or `_max` (≤).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    // AI signature
    /// Pattern regularity needed for the signature (default: 0.93, inclusive)
    pub signature_pattern_min: f64,
    /// Edge sharpness allowed for the signature (default: 0.25, inclusive)
    pub signature_edge_max: f64,
    /// Supporting indicator: texture above (default: 0.6)
    pub support_texture: f64,
    /// Supporting indicator: noise at or below (default: 0.4)
    pub support_noise_max: f64,
    /// Supporting indicator: gradient above (default: 0.7)
    pub support_gradient: f64,
    /// Supporting indicator: frequency above (default: 0.6)
    pub support_frequency: f64,
    /// Supporting indicator: metadata below (default: 0.4)
    pub support_metadata: f64,
    /// Supporting indicators needed to fire (default: 2)
    pub signature_min_support: usize,
    /// Supporting indicators for high confidence (default: 3)
    pub signature_high_support: usize,

    // Extreme indicators
    /// Pattern above (default: 0.9)
    pub extreme_pattern: f64,
    /// Texture above (default: 0.8)
    pub extreme_texture: f64,
    /// Gradient above (default: 0.85)
    pub extreme_gradient: f64,
    /// Frequency above (default: 0.8)
    pub extreme_frequency: f64,
    /// Extreme indicators needed to fire (default: 3)
    pub extreme_min_count: usize,
    /// Extreme indicators for high confidence (default: 4)
    pub extreme_high_count: usize,

    // Real camera
    /// Metadata above (default: 0.7)
    pub camera_metadata: f64,
    /// Pattern below (default: 0.85)
    pub camera_pattern: f64,

    // Strong real
    /// Noise above (default: 0.6)
    pub real_noise: f64,
    /// Edge below (default: 0.3)
    pub real_edge: f64,
    /// Pattern below (default: 0.7)
    pub real_pattern: f64,
    /// Texture below (default: 0.4)
    pub real_texture: f64,
    /// Metadata above (default: 0.6)
    pub real_metadata: f64,
    /// Real indicators needed to fire (default: 3)
    pub real_min_count: usize,
    /// Real indicators for high confidence (default: 4)
    pub real_high_count: usize,

    // Graphic design
    /// Transparency above (default: 0.3)
    pub graphic_transparency: f64,
    /// Edge above (default: 0.7)
    pub graphic_edge: f64,
    /// Color below (default: 0.3)
    pub graphic_color: f64,
    /// Noise below (default: 0.2)
    pub graphic_noise: f64,
    /// Graphic indicators needed to fire (default: 3)
    pub graphic_min_count: usize,

    // Anti-false-positive
    /// Supporting + extreme AI indicators an AI verdict needs (default: 3)
    pub ai_min_indicators: usize,

    // Low regularity
    /// Pattern below (default: 0.5)
    pub low_regularity_pattern: f64,
    /// Texture below (default: 0.5)
    pub low_regularity_texture: f64,
    /// Color above (default: 0.4)
    pub low_regularity_color: f64,

    // Confidence floor
    /// Scorer probability below which the verdict defaults to real (default: 0.6)
    pub confidence_floor: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            signature_pattern_min: 0.93,
            signature_edge_max: 0.25,
            support_texture: 0.6,
            support_noise_max: 0.4,
            support_gradient: 0.7,
            support_frequency: 0.6,
            support_metadata: 0.4,
            signature_min_support: 2,
            signature_high_support: 3,
            extreme_pattern: 0.9,
            extreme_texture: 0.8,
            extreme_gradient: 0.85,
            extreme_frequency: 0.8,
            extreme_min_count: 3,
            extreme_high_count: 4,
            camera_metadata: 0.7,
            camera_pattern: 0.85,
            real_noise: 0.6,
            real_edge: 0.3,
            real_pattern: 0.7,
            real_texture: 0.4,
            real_metadata: 0.6,
            real_min_count: 3,
            real_high_count: 4,
            graphic_transparency: 0.3,
            graphic_edge: 0.7,
            graphic_color: 0.3,
            graphic_noise: 0.2,
            graphic_min_count: 3,
            ai_min_indicators: 3,
            low_regularity_pattern: 0.5,
            low_regularity_texture: 0.5,
            low_regularity_color: 0.4,
            confidence_floor: 0.6,
        }
    }
}

impl RuleThresholds {
    /// Check that every threshold is finite
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if any threshold is NaN or infinite
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let values = [
            ("signature_pattern_min", self.signature_pattern_min),
            ("signature_edge_max", self.signature_edge_max),
            ("support_texture", self.support_texture),
            ("support_noise_max", self.support_noise_max),
            ("support_gradient", self.support_gradient),
            ("support_frequency", self.support_frequency),
            ("support_metadata", self.support_metadata),
            ("extreme_pattern", self.extreme_pattern),
            ("extreme_texture", self.extreme_texture),
            ("extreme_gradient", self.extreme_gradient),
            ("extreme_frequency", self.extreme_frequency),
            ("camera_metadata", self.camera_metadata),
            ("camera_pattern", self.camera_pattern),
            ("real_noise", self.real_noise),
            ("real_edge", self.real_edge),
            ("real_pattern", self.real_pattern),
            ("real_texture", self.real_texture),
            ("real_metadata", self.real_metadata),
            ("graphic_transparency", self.graphic_transparency),
            ("graphic_edge", self.graphic_edge),
            ("graphic_color", self.graphic_color),
            ("graphic_noise", self.graphic_noise),
            ("low_regularity_pattern", self.low_regularity_pattern),
            ("low_regularity_texture", self.low_regularity_texture),
            ("low_regularity_color", self.low_regularity_color),
            ("confidence_floor", self.confidence_floor),
        ];

        match values.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, value)) => Err(AnalysisError::InvalidInput(format!(
                "rule threshold '{}' is not finite ({})",
                name, value
            ))),
            None => Ok(()),
        }
    }
}

/// How many indicators of each family were present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicatorCounts {
    /// Supporting AI indicators (texture, noise, gradient, frequency, metadata)
    pub supporting_ai: usize,
    /// Extreme AI indicators (pattern, texture, gradient, frequency)
    pub extreme_ai: usize,
    /// Photographic indicators (noise, edge, pattern, texture, metadata)
    pub strong_real: usize,
    /// Graphic-design indicators (transparency, edge, color, noise)
    pub graphic: usize,
}

impl IndicatorCounts {
    /// Count every indicator family for a feature snapshot
    pub fn evaluate(features: &FeatureVector, t: &RuleThresholds) -> Self {
        fn count(flags: &[bool]) -> usize {
            flags.iter().filter(|&&f| f).count()
        }

        Self {
            supporting_ai: count(&[
                features.texture() > t.support_texture,
                features.noise() <= t.support_noise_max,
                features.gradient() > t.support_gradient,
                features.frequency() > t.support_frequency,
                features.metadata_real() < t.support_metadata,
            ]),
            extreme_ai: count(&[
                features.pattern() > t.extreme_pattern,
                features.texture() > t.extreme_texture,
                features.gradient() > t.extreme_gradient,
                features.frequency() > t.extreme_frequency,
            ]),
            strong_real: count(&[
                features.noise() > t.real_noise,
                features.edge() < t.real_edge,
                features.pattern() < t.real_pattern,
                features.texture() < t.real_texture,
                features.metadata_real() > t.real_metadata,
            ]),
            graphic: count(&[
                features.transparency() > t.graphic_transparency,
                features.edge() > t.graphic_edge,
                features.color() < t.graphic_color,
                features.noise() < t.graphic_noise,
            ]),
        }
    }

    /// Supporting plus extreme AI indicators
    pub fn total_ai(&self) -> usize {
        self.supporting_ai + self.extreme_ai
    }
}

/// Label and confidence at some point of rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Current label
    pub label: ImageClass,
    /// Current confidence
    pub confidence: ConfidenceTier,
}

impl Verdict {
    /// Create a verdict
    pub const fn new(label: ImageClass, confidence: ConfidenceTier) -> Self {
        Self { label, confidence }
    }
}

/// Immutable snapshot every rule sees
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Feature scores
    pub features: &'a FeatureVector,
    /// Scorer's largest probability
    pub max_probability: f64,
    /// Precomputed indicator counts
    pub counts: IndicatorCounts,
    /// Thresholds in force
    pub thresholds: &'a RuleThresholds,
}

impl RuleId {
    /// Evaluate this rule
    ///
    /// Returns the replacement verdict if the rule applies, `None` otherwise.
    pub fn apply(self, ctx: &RuleContext<'_>, current: Verdict) -> Option<Verdict> {
        let f = ctx.features;
        let t = ctx.thresholds;
        let c = &ctx.counts;

        match self {
            RuleId::AiSignature => {
                let signature =
                    f.pattern() >= t.signature_pattern_min && f.edge() <= t.signature_edge_max;
                (signature && c.supporting_ai >= t.signature_min_support).then(|| {
                    let confidence = if c.supporting_ai >= t.signature_high_support {
                        ConfidenceTier::High
                    } else {
                        ConfidenceTier::Medium
                    };
                    Verdict::new(ImageClass::AiGenerated, confidence)
                })
            }
            RuleId::ExtremeIndicators => (c.extreme_ai >= t.extreme_min_count).then(|| {
                let confidence = if c.extreme_ai >= t.extreme_high_count {
                    ConfidenceTier::High
                } else {
                    ConfidenceTier::Medium
                };
                Verdict::new(ImageClass::AiGenerated, confidence)
            }),
            RuleId::RealCamera => {
                let camera = f.metadata_real() > t.camera_metadata
                    && f.pattern() < t.camera_pattern
                    && f.transparency() == 0.0;
                camera.then_some(Verdict::new(ImageClass::Real, ConfidenceTier::High))
            }
            RuleId::StrongReal => (c.strong_real >= t.real_min_count).then(|| {
                let confidence = if c.strong_real >= t.real_high_count {
                    ConfidenceTier::High
                } else {
                    ConfidenceTier::Medium
                };
                Verdict::new(ImageClass::Real, confidence)
            }),
            RuleId::GraphicDesign => (c.graphic >= t.graphic_min_count)
                .then_some(Verdict::new(ImageClass::GraphicDesign, ConfidenceTier::High)),
            RuleId::AntiFalsePositive => {
                let unsupported =
                    current.label == ImageClass::AiGenerated && c.total_ai() < t.ai_min_indicators;
                unsupported.then_some(Verdict::new(ImageClass::Real, ConfidenceTier::Medium))
            }
            RuleId::LowRegularity => {
                let irregular = f.pattern() < t.low_regularity_pattern
                    && f.texture() < t.low_regularity_texture
                    && f.color() > t.low_regularity_color;
                irregular.then_some(Verdict::new(ImageClass::Real, ConfidenceTier::Medium))
            }
            RuleId::ConfidenceFloor => (ctx.max_probability < t.confidence_floor)
                .then_some(Verdict::new(ImageClass::Real, ConfidenceTier::Low)),
        }
    }
}

/// Outcome of running the rule list
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Final verdict
    pub verdict: Verdict,
    /// Rules that applied, in evaluation order
    pub fired: Vec<RuleId>,
    /// Indicator counts the rules saw
    pub counts: IndicatorCounts,
}

/// Ordered rule list plus thresholds
///
/// Stateless: evaluating the same inputs always gives the same outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEngine {
    rules: Vec<RuleId>,
    thresholds: RuleThresholds,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleThresholds::default())
    }
}

impl RuleEngine {
    /// Engine with the default rule order
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self {
            rules: RuleId::DEFAULT_ORDER.to_vec(),
            thresholds,
        }
    }

    /// Replace the rule order; rules not listed are skipped
    pub fn with_rules(mut self, rules: Vec<RuleId>) -> Self {
        self.rules = rules;
        self
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[RuleId] {
        &self.rules
    }

    /// Thresholds in force
    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Run the rules over a scorer verdict
    ///
    /// # Arguments
    ///
    /// * `features` - Feature snapshot
    /// * `provisional` - Scorer argmax; the starting label, with `low` confidence
    /// * `max_probability` - Scorer's largest probability
    ///
    /// # Returns
    ///
    /// The verdict after the last applicable rule, the rules that applied, and the
    /// indicator counts
    pub fn evaluate(
        &self,
        features: &FeatureVector,
        provisional: ImageClass,
        max_probability: f64,
    ) -> RuleOutcome {
        let ctx = RuleContext {
            features,
            max_probability,
            counts: IndicatorCounts::evaluate(features, &self.thresholds),
            thresholds: &self.thresholds,
        };

        let mut verdict = Verdict::new(provisional, ConfidenceTier::Low);
        let mut fired = Vec::new();

        for &rule in &self.rules {
            if let Some(next) = rule.apply(&ctx, verdict) {
                log::debug!(
                    "Rule {} fired: {} ({}) -> {} ({})",
                    rule,
                    verdict.label,
                    verdict.confidence,
                    next.label,
                    next.confidence
                );
                verdict = next;
                fired.push(rule);
            }
        }

        RuleOutcome {
            verdict,
            fired,
            counts: ctx.counts,
        }
    }
}

//! Integration tests for the image analysis engine

use pixelcheck::{
    analyze_image, analyze_image_with_cancellation, analyze_rgba, classify, AnalysisConfig,
    AnalysisError, AnalysisGate, CancellationToken, ConfidenceTier, FeatureKind, FeatureVector,
    ImageClass, ImageFormat, ImageMetadata, LinearModel, PixelBuffer, Rgba, RuleEngine, RuleId,
};

/// Deterministic speckle texture from a small LCG
fn speckled(width: usize, height: usize, seed: u32) -> PixelBuffer {
    let mut state = seed;
    PixelBuffer::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let jitter = (state >> 24) as usize % 40;
        let base = (x * 2 + y) % 180;
        let v = (base + jitter) as u8;
        Rgba::opaque(v, v.saturating_add(20), v / 2 + 40)
    })
    .unwrap()
}

fn ai_signature_features(pattern: f64) -> FeatureVector {
    FeatureVector::new([0.5, 0.0, 0.2, 0.1, pattern, 0.3, 0.7, 0.7, 0.8, 0.2]).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_image() {
        let buffer = PixelBuffer::filled(100, 100, Rgba::opaque(120, 80, 200)).unwrap();
        let result = analyze_image(buffer, None, AnalysisConfig::default())
            .expect("Analysis should succeed");

        let expected = [0.1, 0.0, 0.3, 0.2, 0.98, 0.0, 1.0, 0.7, 0.1, 0.5];
        let actual = result.classification.features.as_array();
        for (kind, (&a, &e)) in FeatureKind::ALL.iter().zip(actual.iter().zip(expected.iter())) {
            assert!((a - e).abs() < 1e-9, "{}: expected {}, got {}", kind, e, a);
        }

        assert_eq!(result.label(), ImageClass::AiGenerated);
        assert_eq!(result.confidence(), ConfidenceTier::High);
        assert_eq!(result.classification.fired_rules, vec![RuleId::AiSignature]);

        let color = result.feature(FeatureKind::ColorDiversity).unwrap();
        assert_eq!(color.metric("unique_colors"), Some(1.0));

        assert_eq!(result.metadata.width, 100);
        assert_eq!(result.metadata.height, 100);
        assert!(result.metadata.processing_time_ms >= 0.0);
        assert!(result.metadata.image_metadata.is_none());
    }

    #[test]
    fn test_fully_transparent_image() {
        let buffer = PixelBuffer::filled(50, 50, Rgba::new(0, 0, 0, 0)).unwrap();
        let result = analyze_image(buffer, None, AnalysisConfig::default()).unwrap();

        let transparency = result.feature(FeatureKind::Transparency).unwrap();
        assert_eq!(transparency.score, 1.0);
        assert_eq!(transparency.metric("transparency_ratio"), Some(1.0));
        assert_eq!(transparency.flag("has_significant_transparency"), Some(true));
    }

    #[test]
    fn test_ai_signature_vector() {
        let result = classify(
            &ai_signature_features(0.98),
            &LinearModel::default(),
            &RuleEngine::default(),
        )
        .unwrap();

        assert_eq!(result.label, ImageClass::AiGenerated);
        assert_eq!(result.confidence, ConfidenceTier::High);
        assert_eq!(result.fired_rules.first(), Some(&RuleId::AiSignature));
        assert_eq!(result.indicators.supporting_ai, 5);
    }

    #[test]
    fn test_low_probability_forces_real_low() {
        let engine = RuleEngine::default();
        for provisional in ImageClass::ALL {
            let outcome = engine.evaluate(&ai_signature_features(0.98), provisional, 0.52);
            assert_eq!(outcome.verdict.label, ImageClass::Real);
            assert_eq!(outcome.verdict.confidence, ConfidenceTier::Low);
            assert_eq!(outcome.fired.last(), Some(&RuleId::ConfidenceFloor));
        }
    }

    #[test]
    fn test_signature_threshold_boundary() {
        let model = LinearModel::default();
        let engine = RuleEngine::default();

        let below = classify(&ai_signature_features(0.92), &model, &engine).unwrap();
        assert!(!below.fired_rules.contains(&RuleId::AiSignature));

        let at = classify(&ai_signature_features(0.93), &model, &engine).unwrap();
        assert!(at.fired_rules.contains(&RuleId::AiSignature));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        for seed in [1u32, 7, 42] {
            let result =
                analyze_image(speckled(96, 80, seed), None, AnalysisConfig::default()).unwrap();
            let probs = &result.classification.probabilities;
            assert!((probs.sum() - 1.0).abs() < 1e-9);
            assert!(probs.to_array().iter().all(|p| *p > 0.0 && *p < 1.0));
            assert_eq!(
                result.classification.max_probability,
                probs.argmax().1,
                "max probability should match argmax"
            );
        }
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let first = analyze_image(speckled(120, 90, 3), None, AnalysisConfig::default()).unwrap();
        let second = analyze_image(speckled(120, 90, 3), None, AnalysisConfig::default()).unwrap();

        assert_eq!(first.classification, second.classification);
        assert_eq!(first.features, second.features);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let meta = ImageMetadata::new(ImageFormat::Jpeg, 48_000, 120, 90);
        let parallel = analyze_image(speckled(120, 90, 11), Some(&meta), AnalysisConfig::default())
            .unwrap();

        let config = AnalysisConfig {
            parallel_extraction: false,
            ..AnalysisConfig::default()
        };
        let sequential = analyze_image(speckled(120, 90, 11), Some(&meta), config).unwrap();

        assert_eq!(parallel.features, sequential.features);
        assert_eq!(parallel.classification, sequential.classification);
        assert!(parallel.metadata.parallel_extraction);
        assert!(!sequential.metadata.parallel_extraction);

        let kinds: Vec<FeatureKind> = parallel.features.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, FeatureKind::ALL.to_vec());
    }

    #[test]
    fn test_tiny_image_uses_neutral_scores() {
        let buffer = PixelBuffer::filled(4, 4, Rgba::opaque(200, 10, 10)).unwrap();
        let result = analyze_image(buffer, None, AnalysisConfig::default()).unwrap();
        let f = &result.classification.features;

        assert_eq!(f.color(), 0.3);
        assert_eq!(f.transparency(), 0.0);
        assert_eq!(f.noise(), 0.4);
        assert_eq!(f.edge(), 0.2);
        assert_eq!(f.pattern(), 0.05);
        assert_eq!(f.compression(), 0.0);
        assert_eq!(f.texture(), 0.0);
        assert_eq!(f.frequency(), 0.5);
        assert_eq!(f.gradient(), 0.1);
        assert_eq!(f.metadata_real(), 0.5);
        assert!(f.as_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_camera_metadata_is_used() {
        let meta = ImageMetadata::new(ImageFormat::Jpeg, 30_000_000, 4032, 3024);
        let result = analyze_image(speckled(64, 48, 5), Some(&meta), AnalysisConfig::default())
            .unwrap();

        assert_eq!(result.classification.features.metadata_real(), 1.0);
        assert_eq!(result.metadata.image_metadata.as_ref(), Some(&meta));
    }

    #[test]
    fn test_rgba_buffer_validation() {
        let short = analyze_rgba(10, 10, vec![0u8; 10 * 10 * 4 - 1], None, AnalysisConfig::default());
        assert!(matches!(short, Err(AnalysisError::InvalidBuffer(_))));

        let empty = analyze_rgba(0, 10, Vec::new(), None, AnalysisConfig::default());
        assert!(matches!(empty, Err(AnalysisError::InvalidBuffer(_))));

        let ok = analyze_rgba(8, 8, [9u8, 9, 9, 255].repeat(64), None, AnalysisConfig::default());
        assert!(ok.is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.model.real.bias = f64::NAN;
        let buffer = PixelBuffer::filled(16, 16, Rgba::opaque(1, 2, 3)).unwrap();
        assert!(matches!(
            analyze_image(buffer, None, config),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cancelled_token_discards_work() {
        let token = CancellationToken::new();
        token.cancel();

        let result = analyze_image_with_cancellation(
            speckled(64, 64, 2),
            None,
            AnalysisConfig::default(),
            &token,
        );
        assert_eq!(result.unwrap_err(), AnalysisError::Cancelled);
    }

    #[test]
    fn test_newer_submission_supersedes_older() {
        let gate = AnalysisGate::new();
        let first = gate.begin();
        let second = gate.begin();

        assert!(first.is_cancelled());
        assert!(!gate.is_current(&first));
        assert!(gate.is_current(&second));

        let stale = analyze_image_with_cancellation(
            speckled(64, 64, 4),
            None,
            AnalysisConfig::default(),
            &first,
        );
        assert_eq!(stale.unwrap_err(), AnalysisError::Cancelled);

        let fresh = analyze_image_with_cancellation(
            speckled(64, 64, 4),
            None,
            AnalysisConfig::default(),
            &second,
        );
        assert!(fresh.is_ok());
    }

    #[test]
    fn test_result_serializes_to_json() {
        let buffer = PixelBuffer::filled(32, 32, Rgba::opaque(250, 250, 250)).unwrap();
        let result = analyze_image(buffer, None, AnalysisConfig::default()).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        let label = json["classification"]["label"].as_str().unwrap();
        assert_eq!(label, result.label().as_str());
        assert_eq!(json["features"].as_array().unwrap().len(), 10);
    }
}

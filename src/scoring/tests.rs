use super::*;
use crate::imaging::ImageDomain;

mod similarity_tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_one() {
        let v = [0.3, -0.2, 0.9, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_zero_vector_is_safe() {
        let zero = [0.0f32; 4];
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(score_pair(&zero, &v), (0.0, 1.0));
    }

    #[test]
    fn test_length_mismatch_and_empty_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_negative_similarity_clamps_to_zero() {
        let raw = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((raw + 1.0).abs() < 1e-12);

        let (similarity, distance) = score_pair(&[1.0, 0.0], &[-1.0, 0.0]);
        assert_eq!(similarity, 0.0);
        assert_eq!(distance, 1.0);
    }

    #[test]
    fn test_distance_stays_in_unit_interval() {
        assert_eq!(distance_from_similarity(1.2), 0.0);
        assert_eq!(distance_from_similarity(-0.4), 1.0);
        assert_eq!(distance_from_similarity(f64::NAN), 1.0);
        assert!((distance_from_similarity(0.75) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_scale_invariance() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
    }
}

mod confidence_tests {
    use super::*;

    const T: f64 = 0.30;

    #[test]
    fn test_cross_domain_boundary_is_inclusive() {
        assert_eq!(
            classify_confidence(0.30, T, true).level,
            ConfidenceLevel::PossibleMatch
        );
        assert_eq!(
            classify_confidence(0.300001, T, true).level,
            ConfidenceLevel::WeakMatch
        );
    }

    #[test]
    fn test_cross_domain_ladder() {
        let cases = [
            (0.0, ConfidenceLevel::PossibleMatch, 75),
            (0.45, ConfidenceLevel::WeakMatch, 55),
            (0.46, ConfidenceLevel::Uncertain, 35),
            (0.60, ConfidenceLevel::Uncertain, 35),
            (0.61, ConfidenceLevel::Unlikely, 15),
            (1.0, ConfidenceLevel::Unlikely, 15),
        ];
        for (distance, level, score) in cases {
            let c = classify_confidence(distance, T, true);
            assert_eq!(c.level, level, "distance {distance}");
            assert_eq!(c.score, score, "distance {distance}");
        }
    }

    #[test]
    fn test_cross_domain_ignores_model_threshold() {
        assert_eq!(
            classify_confidence(0.40, 0.68, true).level,
            classify_confidence(0.40, 0.10, true).level
        );
    }

    #[test]
    fn test_same_domain_ladder_scales_with_threshold() {
        let cases = [
            (0.15, ConfidenceLevel::High, 95),
            (0.16, ConfidenceLevel::Medium, 80),
            (0.21, ConfidenceLevel::Medium, 80),
            (0.22, ConfidenceLevel::Low, 60),
            (0.30, ConfidenceLevel::Low, 60),
            (0.31, ConfidenceLevel::VeryLow, 30),
        ];
        for (distance, level, score) in cases {
            let c = classify_confidence(distance, T, false);
            assert_eq!(c.level, level, "distance {distance}");
            assert_eq!(c.score, score, "distance {distance}");
        }

        assert_eq!(
            classify_confidence(0.30, 0.68, false).level,
            ConfidenceLevel::High
        );
    }

    #[test]
    fn test_match_quality_labels() {
        assert_eq!(classify_confidence(0.0, T, false).match_quality, "Strong match");
        assert_eq!(classify_confidence(0.9, T, false).match_quality, "No match");
        assert_eq!(
            classify_confidence(0.1, T, true).match_quality,
            "Possible match - investigate further"
        );
        assert_eq!(classify_confidence(0.5, T, true).match_quality, "Inconclusive");
    }

    #[test]
    fn test_error_confidence() {
        let c = Confidence::error();
        assert_eq!(c.level, ConfidenceLevel::Error);
        assert_eq!(c.score, 0);
        assert_eq!(c.match_quality, "Comparison failed");
    }

    #[test]
    fn test_level_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::PossibleMatch).unwrap(),
            "\"possible_match\""
        );
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::VeryLow).unwrap(),
            "\"very_low\""
        );
        assert_eq!(ConfidenceLevel::WeakMatch.to_string(), "weak_match");
    }
}

mod result_tests {
    use super::*;

    #[test]
    fn test_scored_result_sets_cross_domain_flag() {
        let c = classify_confidence(0.2, 0.3, true);
        let result = ComparisonResult::scored(
            0.8,
            0.2,
            ImageDomain::Sketch,
            ImageDomain::Photo,
            c,
            "Facenet512",
        );

        assert!(result.is_cross_domain);
        assert_eq!(result.metric_used, "cosine");
        assert_eq!(result.confidence_score, 75);
        assert!(!result.is_failure());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failed_result_is_sentinel() {
        let result = ComparisonResult::failed("no face detected");

        assert_eq!(result.distance, 1.0);
        assert_eq!(result.similarity, 0.0);
        assert_eq!(result.confidence_level, ConfidenceLevel::Error);
        assert_eq!(result.confidence_score, 0);
        assert_eq!(result.model_used, "failed");
        assert_eq!(result.error.as_deref(), Some("no face detected"));
        assert!(result.is_failure());
    }

    #[test]
    fn test_verified_requires_similarity_above_cutoff() {
        let result = |similarity: f64| {
            ComparisonResult::scored(
                similarity,
                1.0 - similarity,
                ImageDomain::Sketch,
                ImageDomain::Photo,
                classify_confidence(1.0 - similarity, 0.3, true),
                "Facenet512",
            )
        };

        assert!(result(0.56).verified);
        assert!(!result(0.55).verified);
        assert!(!result(0.2).verified);
        assert!(!ComparisonResult::failed("boom").verified);
        assert_eq!(serde_json::to_value(result(0.9)).unwrap()["verified"], true);
    }

    #[test]
    fn test_processing_time_rounds_to_millis() {
        let result = ComparisonResult::failed("x").with_processing_time(1.23456);
        assert_eq!(result.processing_time, 1.235);
        assert_eq!(round_millis(0.0004), 0.0);
    }

    #[test]
    fn test_error_field_omitted_when_absent() {
        let c = classify_confidence(0.1, 0.3, false);
        let ok = ComparisonResult::scored(
            0.9,
            0.1,
            ImageDomain::Photo,
            ImageDomain::Photo,
            c,
            "Facenet512",
        );
        let json = serde_json::to_value(&ok).unwrap();

        assert!(json.get("error").is_none());
        assert_eq!(json["confidence_level"], "high");
        assert_eq!(json["probe_domain"], "photo");

        let failed = serde_json::to_value(ComparisonResult::failed("boom")).unwrap();
        assert_eq!(failed["error"], "boom");
        assert_eq!(failed["confidence_level"], "error");
    }
}

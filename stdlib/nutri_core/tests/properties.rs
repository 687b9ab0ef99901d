use nutri_core::classify::{expected_weight_kg, standard_deviation_kg};
use nutri_core::{classify, NutritionStatus};
use proptest::prelude::*;

fn decimals_at_most_two(x: f64) -> bool {
    let scaled = x * 100.0;
    (scaled - scaled.round()).abs() < 1e-6
}

proptest! {
    #[test]
    fn weight_on_expectation_is_normal(height in 50.5f64..130.0, muac in 12.5f64..20.0) {
        let c = classify(height, expected_weight_kg(height), muac);
        prop_assert_eq!(c.z_score, 0.0);
        prop_assert_eq!(c.status, NutritionStatus::Normal);
    }

    #[test]
    fn severe_muac_is_always_sam(
        height in -50.0f64..200.0,
        weight in -10.0f64..60.0,
        muac in 0.0f64..11.5,
    ) {
        prop_assert_eq!(classify(height, weight, muac).status, NutritionStatus::Sam);
    }

    #[test]
    fn moderate_muac_triggers_independently(
        height in 50.5f64..130.0,
        k in -1.99f64..5.0,
        muac in 11.5f64..12.5,
    ) {
        let expected = expected_weight_kg(height);
        let weight = expected + k * standard_deviation_kg(expected);
        prop_assert_eq!(classify(height, weight, muac).status, NutritionStatus::Mam);
    }

    #[test]
    fn severity_never_rises_with_weight(
        height in 50.5f64..130.0,
        muac in 12.5f64..20.0,
        w1 in 0.5f64..40.0,
        dw in 0.0f64..10.0,
    ) {
        let lighter = classify(height, w1, muac);
        let heavier = classify(height, w1 + dw, muac);
        prop_assert!(heavier.status <= lighter.status);
    }

    #[test]
    fn score_has_at_most_two_decimals(
        height in 50.5f64..130.0,
        weight in 0.5f64..40.0,
        muac in 5.0f64..20.0,
    ) {
        let c = classify(height, weight, muac);
        prop_assert!(c.z_score.is_finite());
        prop_assert!(decimals_at_most_two(c.z_score), "z_score {} has extra digits", c.z_score);
    }

    #[test]
    fn classification_is_deterministic(
        height in -100.0f64..300.0,
        weight in -50.0f64..100.0,
        muac in -5.0f64..30.0,
    ) {
        let a = classify(height, weight, muac);
        let b = classify(height, weight, muac);
        prop_assert_eq!(a.status, b.status);
        prop_assert!(a.z_score == b.z_score || (a.z_score.is_nan() && b.z_score.is_nan()));
    }
}

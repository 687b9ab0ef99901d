//! Weight-for-height and MUAC screening.
//!
//! Expected weight comes from a linear placeholder model rather than the WHO
//! growth-reference tables, and the spread is a fixed fraction of that
//! expectation. MUAC and the deviation score are independent triggers: either
//! one crossing a threshold is enough to flag the child.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::NutritionStatus;

/// Height (cm) at which the linear model's slope starts.
pub const REFERENCE_HEIGHT_CM: f64 = 50.0;
/// Expected weight gained per centimetre above `REFERENCE_HEIGHT_CM`.
pub const WEIGHT_PER_CM_KG: f64 = 0.3;
/// Expected weight (kg) at `REFERENCE_HEIGHT_CM`.
pub const BASE_WEIGHT_KG: f64 = 3.0;
/// Standard deviation as a fraction of expected weight.
pub const SD_FRACTION: f64 = 0.12;

/// MUAC strictly below this is severe.
pub const SAM_MUAC_CM: f64 = 11.5;
/// MUAC strictly below this (and not severe) is moderate.
pub const MAM_MUAC_CM: f64 = 12.5;
/// Deviation score strictly below this is severe.
pub const SAM_Z_SCORE: f64 = -3.0;
/// Deviation score strictly below this (and not severe) is moderate.
pub const MAM_Z_SCORE: f64 = -2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Classification {
    pub status: NutritionStatus,
    /// Deviation score rounded to two decimals. May be infinite or NaN for
    /// heights at or below `REFERENCE_HEIGHT_CM`.
    #[cfg_attr(feature = "serde", serde(with = "score_serde"))]
    pub z_score: f64,
}

impl Classification {
    /// Same status and score, with NaN scores treated as equal.
    pub fn same_result(&self, other: &Classification) -> bool {
        self.status == other.status
            && (self.z_score == other.z_score
                || (self.z_score.is_nan() && other.z_score.is_nan()))
    }
}

/// Serde adapter for deviation scores.
///
/// JSON has no inf or NaN, so a non-finite score is written as `null` and
/// `null` reads back as NaN. The sign of an infinite score does not survive;
/// re-running the classifier on the stored measurements restores it.
#[cfg(feature = "serde")]
pub mod score_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if score.is_finite() {
            serializer.serialize_f64(*score)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("invalid measurement: {reason}")]
    InvalidMeasurement { reason: String },
}

pub fn expected_weight_kg(height_cm: f64) -> f64 {
    (height_cm - REFERENCE_HEIGHT_CM) * WEIGHT_PER_CM_KG + BASE_WEIGHT_KG
}

pub fn standard_deviation_kg(expected_weight_kg: f64) -> f64 {
    expected_weight_kg * SD_FRACTION
}

/// Unrounded deviation of `weight_kg` from the expected weight for `height_cm`.
///
/// Plain IEEE division: a zero spread yields ±inf or NaN.
pub fn raw_z_score(height_cm: f64, weight_kg: f64) -> f64 {
    let expected = expected_weight_kg(height_cm);
    let sd = standard_deviation_kg(expected);
    (weight_kg - expected) / sd
}

/// Rounds to two decimals on the exact binary value, so 6.295 (stored as
/// 6.29499...) gives 6.29. Exact halves go away from zero. Non-finite values
/// pass through.
pub fn round_to_hundredths(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // An exact half at the third decimal is an odd number of eighths; scaling
    // by 8 and by 100 is exact there.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return (value * 100.0).round() / 100.0;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Threshold rules on an unrounded score.
///
/// Every comparison is a plain `<`/`>=`, so a NaN score never triggers and
/// only MUAC can raise the status.
pub fn status_for(muac_cm: f64, z_score: f64) -> NutritionStatus {
    if muac_cm < SAM_MUAC_CM || z_score < SAM_Z_SCORE {
        NutritionStatus::Sam
    } else if (muac_cm >= SAM_MUAC_CM && muac_cm < MAM_MUAC_CM)
        || (z_score >= SAM_Z_SCORE && z_score < MAM_Z_SCORE)
    {
        NutritionStatus::Mam
    } else {
        NutritionStatus::Normal
    }
}

/// Classifies a child from height (cm), weight (kg) and MUAC (cm).
///
/// Total over `f64`: no input is rejected. Use [`classify_checked`] to refuse
/// measurements the linear model cannot score.
pub fn classify(height_cm: f64, weight_kg: f64, muac_cm: f64) -> Classification {
    let z = raw_z_score(height_cm, weight_kg);
    Classification {
        status: status_for(muac_cm, z),
        z_score: round_to_hundredths(z),
    }
}

/// Same as [`classify`] but rejects non-finite inputs and heights at or below
/// `REFERENCE_HEIGHT_CM`, where the expected weight is not positive.
pub fn classify_checked(
    height_cm: f64,
    weight_kg: f64,
    muac_cm: f64,
) -> Result<Classification, ClassifyError> {
    for (name, value) in [
        ("height", height_cm),
        ("weight", weight_kg),
        ("MUAC", muac_cm),
    ] {
        if !value.is_finite() {
            return Err(ClassifyError::InvalidMeasurement {
                reason: format!("{name} must be finite (got {value})"),
            });
        }
    }
    if height_cm <= REFERENCE_HEIGHT_CM {
        return Err(ClassifyError::InvalidMeasurement {
            reason: format!(
                "height must be above {REFERENCE_HEIGHT_CM} cm for weight-for-height \
                 (got {height_cm})"
            ),
        });
    }
    Ok(classify(height_cm, weight_kg, muac_cm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_model_constants() {
        assert_abs_diff_eq!(expected_weight_kg(50.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(expected_weight_kg(85.0), 13.5, epsilon = 1e-9);
        assert_abs_diff_eq!(standard_deviation_kg(13.5), 1.62, epsilon = 1e-9);
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round_to_hundredths(-2.1666666), -2.17);
        assert_eq!(round_to_hundredths(1.234), 1.23);
        assert_eq!(round_to_hundredths(0.0), 0.0);
        assert!(round_to_hundredths(f64::NAN).is_nan());
        assert_eq!(round_to_hundredths(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn rounding_follows_the_stored_binary_value() {
        // Both literals sit just below the half in binary.
        assert_eq!(round_to_hundredths(6.295), 6.29);
        assert_eq!(round_to_hundredths(4.345), 4.34);
        assert_eq!(round_to_hundredths(-4.345), -4.34);
        // Exact halves round away from zero.
        assert_eq!(round_to_hundredths(0.125), 0.13);
        assert_eq!(round_to_hundredths(-2.375), -2.38);
        assert_eq!(round_to_hundredths(1.005), 1.0);
    }

    #[test]
    fn same_result_treats_nan_scores_as_equal() {
        let nan = classify(40.0, 0.0, 13.0);
        assert!(nan.z_score.is_nan());
        assert!(nan.same_result(&classify(40.0, 0.0, 13.0)));
        assert_ne!(nan, nan);
        let sam = classify(92.0, 9.2, 11.2);
        assert!(sam.same_result(&sam));
        assert!(!sam.same_result(&classify(92.0, 9.3, 11.2)));
        assert!(!nan.same_result(&classify(40.0, 0.0, 12.0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn non_finite_scores_serialize_as_null() {
        let inf = classify(40.0, 5.0, 13.0);
        assert_eq!(inf.z_score, f64::INFINITY);
        let json = serde_json::to_string(&inf).unwrap();
        assert_eq!(json, r#"{"status":"Normal","zScore":null}"#);
        let back: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, NutritionStatus::Normal);
        assert!(back.z_score.is_nan());

        let finite: Classification =
            serde_json::from_str(r#"{"status":"MAM","zScore":-2.12}"#).unwrap();
        assert_eq!(finite.z_score, -2.12);
    }

    #[test]
    fn thresholds_are_half_open() {
        assert_eq!(status_for(11.5, 0.0), NutritionStatus::Mam);
        assert_eq!(status_for(11.499, 0.0), NutritionStatus::Sam);
        assert_eq!(status_for(12.5, 0.0), NutritionStatus::Normal);
        assert_eq!(status_for(13.0, -3.0), NutritionStatus::Mam);
        assert_eq!(status_for(13.0, -3.0001), NutritionStatus::Sam);
        assert_eq!(status_for(13.0, -2.0), NutritionStatus::Normal);
        assert_eq!(status_for(13.0, -2.0001), NutritionStatus::Mam);
    }

    #[test]
    fn nan_score_only_honours_muac() {
        assert_eq!(status_for(13.0, f64::NAN), NutritionStatus::Normal);
        assert_eq!(status_for(12.0, f64::NAN), NutritionStatus::Mam);
        assert_eq!(status_for(11.0, f64::NAN), NutritionStatus::Sam);
    }

    #[test]
    fn decision_uses_unrounded_score() {
        // -2.004 rounds to -2.0 but is still below the moderate cut-off.
        let height = 85.0;
        let expected = expected_weight_kg(height);
        let weight = expected + (-2.004) * standard_deviation_kg(expected);
        let c = classify(height, weight, 13.0);
        assert_eq!(c.z_score, -2.0);
        assert_eq!(c.status, NutritionStatus::Mam);
    }

    #[test]
    fn checked_rejects_degenerate_height() {
        let err = classify_checked(50.0, 3.0, 13.0).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidMeasurement { .. }));
        assert!(classify_checked(40.0, 3.0, 13.0).is_err());
        assert!(classify_checked(85.0, f64::INFINITY, 13.0).is_err());
        assert!(classify_checked(85.0, 10.5, f64::NAN).is_err());
    }

    #[test]
    fn checked_agrees_with_classify_on_valid_input() {
        assert_eq!(
            classify_checked(92.0, 9.2, 11.2).unwrap(),
            classify(92.0, 9.2, 11.2)
        );
    }
}

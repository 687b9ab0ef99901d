use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Acute-malnutrition category assigned to a single measurement.
///
/// Variants are declared in order of increasing severity, so the derived
/// `Ord` can be used directly to compare outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NutritionStatus {
    Normal,
    /// Moderate acute malnutrition.
    #[cfg_attr(feature = "serde", serde(rename = "MAM"))]
    Mam,
    /// Severe acute malnutrition.
    #[cfg_attr(feature = "serde", serde(rename = "SAM"))]
    Sam,
}

impl NutritionStatus {
    pub const ALL: [NutritionStatus; 3] = [
        NutritionStatus::Normal,
        NutritionStatus::Mam,
        NutritionStatus::Sam,
    ];

    /// Short code used in records and exports.
    pub fn code(self) -> &'static str {
        match self {
            NutritionStatus::Normal => "Normal",
            NutritionStatus::Mam => "MAM",
            NutritionStatus::Sam => "SAM",
        }
    }

    /// Human-facing label shown next to a measurement.
    pub fn badge_label(self) -> &'static str {
        match self {
            NutritionStatus::Normal => "Normal",
            NutritionStatus::Mam => "MAM (Moderate)",
            NutritionStatus::Sam => "SAM (Severe)",
        }
    }

    /// 0 for normal, 1 for moderate, 2 for severe.
    pub fn severity(self) -> u8 {
        match self {
            NutritionStatus::Normal => 0,
            NutritionStatus::Mam => 1,
            NutritionStatus::Sam => 2,
        }
    }

    pub fn is_malnourished(self) -> bool {
        !matches!(self, NutritionStatus::Normal)
    }
}

impl fmt::Display for NutritionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown nutrition status '{0}' (expected Normal, MAM or SAM)")]
pub struct ParseStatusError(pub String);

impl FromStr for NutritionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("normal") {
            Ok(NutritionStatus::Normal)
        } else if t.eq_ignore_ascii_case("mam") {
            Ok(NutritionStatus::Mam)
        } else if t.eq_ignore_ascii_case("sam") {
            Ok(NutritionStatus::Sam)
        } else {
            Err(ParseStatusError(t.to_string()))
        }
    }
}

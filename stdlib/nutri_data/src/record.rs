use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use nutri_core::traits::require_non_empty;
use nutri_core::{
    Classification, Identifiable, Measurement, NutritionStatus, Validatable, ValidationError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaType {
    Rural,
    Urban,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(ParseEnumError {
                kind: "gender",
                value: s.trim().to_string(),
            }),
        }
    }
}

impl FromStr for AreaType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rural" => Ok(AreaType::Rural),
            "urban" => Ok(AreaType::Urban),
            _ => Err(ParseEnumError {
                kind: "area type",
                value: s.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Male => "male",
            Gender::Female => "female",
        })
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AreaType::Rural => "Rural",
            AreaType::Urban => "Urban",
        })
    }
}

/// A reporting unit: an Anganwadi centre or a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub name: String,
    pub district: String,
    pub area_type: AreaType,
}

impl Identifiable for School {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Validatable for School {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("school.id", &self.id)?;
        require_non_empty("school.name", &self.name)?;
        require_non_empty("school.district", &self.district)?;
        Ok(())
    }
}

/// A form submission after parsing, before it is given an id and a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChildRecord {
    pub name: String,
    pub age_months: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub muac_cm: f64,
    pub status: NutritionStatus,
    #[serde(with = "nutri_core::score_serde")]
    pub z_score: f64,
    pub school_id: String,
    pub area_type: AreaType,
}

/// A stored measurement of one child with the classification it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub id: String,
    pub name: String,
    pub age_months: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub muac_cm: f64,
    pub status: NutritionStatus,
    #[serde(with = "nutri_core::score_serde")]
    pub z_score: f64,
    pub school_id: String,
    pub area_type: AreaType,
    pub timestamp: NaiveDate,
}

impl ChildRecord {
    pub fn from_new(id: impl Into<String>, timestamp: NaiveDate, new: NewChildRecord) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            age_months: new.age_months,
            gender: new.gender,
            height_cm: new.height_cm,
            weight_kg: new.weight_kg,
            muac_cm: new.muac_cm,
            status: new.status,
            z_score: new.z_score,
            school_id: new.school_id,
            area_type: new.area_type,
            timestamp,
        }
    }

    pub fn measurement(&self) -> Measurement {
        Measurement::new(self.height_cm, self.weight_kg, self.muac_cm)
    }

    pub fn classification(&self) -> Classification {
        Classification {
            status: self.status,
            z_score: self.z_score,
        }
    }

    /// Recomputes status and score from the stored measurements.
    ///
    /// Returns true when the stored classification changed.
    pub fn reclassify(&mut self) -> bool {
        let fresh = self.measurement().classify();
        let changed = !fresh.same_result(&self.classification());
        if changed {
            log::debug!(
                "record {}: {} ({}) -> {} ({})",
                self.id,
                self.status,
                self.z_score,
                fresh.status,
                fresh.z_score
            );
        }
        self.status = fresh.status;
        self.z_score = fresh.z_score;
        changed
    }
}

impl Identifiable for ChildRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Validatable for ChildRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("record.id", &self.id)?;
        require_non_empty("record.name", &self.name)?;
        require_non_empty("record.school_id", &self.school_id)?;
        self.measurement().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChildRecord {
        ChildRecord {
            id: "7".into(),
            name: "Reyansh Das".into(),
            age_months: 42,
            gender: Gender::Male,
            height_cm: 98.0,
            weight_kg: 10.5,
            muac_cm: 11.8,
            status: NutritionStatus::Mam,
            z_score: -2.8,
            school_id: "S4".into(),
            area_type: AreaType::Urban,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        }
    }

    #[test]
    fn serializes_with_dashboard_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["ageMonths"], 42);
        assert_eq!(json["muacCm"], 11.8);
        assert_eq!(json["zScore"], -2.8);
        assert_eq!(json["status"], "MAM");
        assert_eq!(json["gender"], "male");
        assert_eq!(json["areaType"], "Urban");
        assert_eq!(json["timestamp"], "2024-01-05");
    }

    #[test]
    fn reclassify_updates_stale_status() {
        let mut r = sample();
        assert!(r.reclassify());
        assert_eq!(r.status, NutritionStatus::Sam);
        assert_eq!(r.z_score, -3.3);
        assert!(!r.reclassify());
    }

    #[test]
    fn reclassify_settles_on_nan_scores() {
        let mut r = sample();
        r.height_cm = 40.0;
        r.weight_kg = 0.0;
        r.muac_cm = 13.0;
        assert!(r.reclassify());
        assert!(r.z_score.is_nan());
        assert_eq!(r.status, NutritionStatus::Normal);
        assert!(!r.reclassify());
    }

    #[test]
    fn non_finite_scores_survive_ndjson_export() {
        let mut nan = sample();
        nan.height_cm = 40.0;
        nan.weight_kg = 0.0;
        nan.reclassify();
        let mut inf = sample();
        inf.id = "8".into();
        inf.height_cm = 40.0;
        inf.weight_kg = 5.0;
        inf.reclassify();
        assert_eq!(inf.z_score, f64::INFINITY);

        let text = crate::ndjson::to_ndjson(&[nan, inf]).unwrap();
        assert!(text.contains(r#""zScore":null"#));
        let back: Vec<ChildRecord> = crate::ndjson::from_ndjson(&text).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back.iter().all(|r| r.z_score.is_nan()));
        assert_eq!(back[0].status, NutritionStatus::Sam);
        assert_eq!(back[1].status, NutritionStatus::Sam);

        // Re-running the classifier restores the sign of the infinite score.
        let mut restored = back[1].clone();
        assert!(restored.reclassify());
        assert_eq!(restored.z_score, f64::INFINITY);
    }

    #[test]
    fn classification_mirrors_stored_fields() {
        let c = sample().classification();
        assert_eq!(c.status, NutritionStatus::Mam);
        assert_eq!(c.z_score, -2.8);
    }

    #[test]
    fn parses_enums_leniently() {
        assert_eq!("F".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("urban".parse::<AreaType>(), Ok(AreaType::Urban));
        assert!("suburban".parse::<AreaType>().is_err());
    }

    #[test]
    fn validation_checks_identity_and_measurements() {
        let mut r = sample();
        assert!(r.is_valid());
        r.name = " ".into();
        assert_eq!(
            r.validate(),
            Err(ValidationError::EmptyField {
                field: "record.name"
            })
        );
        let mut r = sample();
        r.weight_kg = 0.0;
        assert!(r.validate().is_err());
    }
}

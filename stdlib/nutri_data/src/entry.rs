//! Data-entry form handling.
//!
//! The form keeps every field as the raw text the worker typed. `preview`
//! mirrors the form's calculate button and `submit` turns the text into a
//! [`NewChildRecord`] ready for a [`crate::book::RecordBook`].

use nutri_core::{Classification, Measurement, MeasurementError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{AreaType, Gender, NewChildRecord, ParseEnumError, School};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("name is required")]
    MissingName,
    #[error("age (months) must be a whole number of months, got '{0}'")]
    InvalidAge(String),
    #[error(transparent)]
    Gender(#[from] ParseEnumError),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
    #[error("unknown school or unit '{0}'")]
    UnknownSchool(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryForm {
    pub name: String,
    pub age_months: String,
    pub gender: String,
    pub height_cm: String,
    pub weight_kg: String,
    pub muac_cm: String,
    pub school_id: String,
}

/// How a submission treats a school id that is not in the unit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSchoolPolicy {
    #[default]
    Reject,
    /// Accept the id and file the child under a rural area.
    AssumeRural,
}

impl EntryForm {
    /// Empty form with the gender and unit selectors on their first option.
    pub fn blank(schools: &[School]) -> Self {
        Self {
            gender: Gender::Male.to_string(),
            school_id: schools.first().map(|s| s.id.clone()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Classification for the typed measurements.
    ///
    /// `None` while any of the three is blank; a typo in a filled field is an
    /// error rather than silently producing a score.
    pub fn preview(&self) -> Result<Option<Classification>, EntryError> {
        if [&self.height_cm, &self.weight_kg, &self.muac_cm]
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return Ok(None);
        }
        let m = self.measurement()?;
        Ok(Some(m.classify()))
    }

    pub fn measurement(&self) -> Result<Measurement, MeasurementError> {
        Measurement::parse(&self.height_cm, &self.weight_kg, &self.muac_cm)
    }

    pub fn submit(&self, schools: &[School]) -> Result<NewChildRecord, EntryError> {
        self.submit_with(schools, UnknownSchoolPolicy::Reject)
    }

    pub fn submit_with(
        &self,
        schools: &[School],
        policy: UnknownSchoolPolicy,
    ) -> Result<NewChildRecord, EntryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EntryError::MissingName);
        }
        let age_raw = self.age_months.trim();
        let age_months: u32 = age_raw
            .parse()
            .map_err(|_| EntryError::InvalidAge(age_raw.to_string()))?;
        let gender: Gender = self.gender.parse()?;
        let measurement = self.measurement()?;

        let school_id = self.school_id.trim();
        let area_type = match schools.iter().find(|s| s.id == school_id) {
            Some(school) => school.area_type,
            None => match policy {
                UnknownSchoolPolicy::Reject => {
                    return Err(EntryError::UnknownSchool(school_id.to_string()))
                }
                UnknownSchoolPolicy::AssumeRural => {
                    log::warn!("unit '{school_id}' not found; filing entry as Rural");
                    AreaType::Rural
                }
            },
        };

        let c = measurement.classify();
        log::debug!(
            "entry for '{name}' at {school_id}: {} (z = {})",
            c.status,
            c.z_score
        );

        Ok(NewChildRecord {
            name: name.to_string(),
            age_months,
            gender,
            height_cm: measurement.height_cm,
            weight_kg: measurement.weight_kg,
            muac_cm: measurement.muac_cm,
            status: c.status,
            z_score: c.z_score,
            school_id: school_id.to_string(),
            area_type,
        })
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{classify, classify_checked, Classification, ClassifyError};
use crate::traits::{require_positive, Validatable, ValidationError};

/// One set of anthropometric readings for a child.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Measurement {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub muac_cm: f64,
}

/// Which reading a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Height,
    Weight,
    Muac,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Height => "height (cm)",
            Field::Weight => "weight (kg)",
            Field::Muac => "MUAC (cm)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementError {
    #[error("{} is required", .0.label())]
    Missing(Field),
    #[error("{} is not a number: '{value}'", .field.label())]
    NotANumber { field: Field, value: String },
    #[error("{} must be finite", .0.label())]
    NonFinite(Field),
}

impl Measurement {
    pub fn new(height_cm: f64, weight_kg: f64, muac_cm: f64) -> Self {
        Self {
            height_cm,
            weight_kg,
            muac_cm,
        }
    }

    /// Parses three user-entered decimal strings.
    ///
    /// Only syntax is checked here; ranges are left to [`Validatable`].
    pub fn parse(height: &str, weight: &str, muac: &str) -> Result<Self, MeasurementError> {
        Ok(Self {
            height_cm: parse_field(Field::Height, height)?,
            weight_kg: parse_field(Field::Weight, weight)?,
            muac_cm: parse_field(Field::Muac, muac)?,
        })
    }

    pub fn classify(&self) -> Classification {
        classify(self.height_cm, self.weight_kg, self.muac_cm)
    }

    pub fn classify_checked(&self) -> Result<Classification, ClassifyError> {
        classify_checked(self.height_cm, self.weight_kg, self.muac_cm)
    }
}

fn parse_field(field: Field, raw: &str) -> Result<f64, MeasurementError> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(MeasurementError::Missing(field));
    }
    let value: f64 = t.parse().map_err(|_| MeasurementError::NotANumber {
        field,
        value: t.to_string(),
    })?;
    // "inf" and "NaN" parse successfully but are not measurements.
    if !value.is_finite() {
        return Err(MeasurementError::NonFinite(field));
    }
    Ok(value)
}

impl Validatable for Measurement {
    fn validate(&self) -> Result<(), ValidationError> {
        require_positive("height_cm", self.height_cm)?;
        require_positive("weight_kg", self.weight_kg)?;
        require_positive("muac_cm", self.muac_cm)?;
        Ok(())
    }
}

//! Unit-level and district-level aggregates over child records.

use std::fmt;
use std::str::FromStr;

use nutri_core::NutritionStatus;
use serde::{Deserialize, Serialize};

use crate::record::{AreaType, ChildRecord, ParseEnumError, School};

/// Prevalence (percent) above which a unit is high risk.
pub const HIGH_RISK_PREVALENCE: f64 = 30.0;
/// Prevalence (percent) above which a unit is medium risk.
pub const MEDIUM_RISK_PREVALENCE: f64 = 15.0;
/// Ages at or below this many months fall in the younger band.
pub const YOUNG_CHILD_MAX_MONTHS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub normal: usize,
    pub mam: usize,
    pub sam: usize,
}

impl StatusCounts {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ChildRecord>,
    {
        let mut counts = Self::default();
        for r in records {
            counts.add(r.status);
        }
        counts
    }

    pub fn add(&mut self, status: NutritionStatus) {
        match status {
            NutritionStatus::Normal => self.normal += 1,
            NutritionStatus::Mam => self.mam += 1,
            NutritionStatus::Sam => self.sam += 1,
        }
    }

    pub fn get(&self, status: NutritionStatus) -> usize {
        match status {
            NutritionStatus::Normal => self.normal,
            NutritionStatus::Mam => self.mam,
            NutritionStatus::Sam => self.sam,
        }
    }

    pub fn total(&self) -> usize {
        NutritionStatus::ALL.iter().map(|&s| self.get(s)).sum()
    }

    /// Children counted under any status that flags malnutrition.
    pub fn malnourished(&self) -> usize {
        NutritionStatus::ALL
            .iter()
            .filter(|s| s.is_malnourished())
            .map(|&s| self.get(s))
            .sum()
    }

    /// Share of MAM + SAM in percent, one decimal. Zero when empty.
    pub fn prevalence_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let pct = self.malnourished() as f64 / total as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Case line for the unit dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLine {
    pub id: String,
    pub name: String,
    pub age_months: u32,
    pub muac_cm: f64,
    #[serde(with = "nutri_core::score_serde")]
    pub z_score: f64,
    pub status: NutritionStatus,
}

impl From<&ChildRecord> for CaseLine {
    fn from(r: &ChildRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            age_months: r.age_months,
            muac_cm: r.muac_cm,
            z_score: r.z_score,
            status: r.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub school: School,
    pub counts: StatusCounts,
    pub total: usize,
    /// Priority list: every SAM case in the unit.
    pub sam_cases: Vec<CaseLine>,
    pub mam_cases: Vec<CaseLine>,
    /// Every child in the unit, in record order.
    pub children: Vec<CaseLine>,
}

pub fn unit_summary(records: &[ChildRecord], school: &School) -> UnitSummary {
    let unit: Vec<&ChildRecord> = records.iter().filter(|r| r.school_id == school.id).collect();
    let counts = StatusCounts::from_records(unit.iter().copied());
    let lines = |status: NutritionStatus| -> Vec<CaseLine> {
        unit.iter()
            .filter(|r| r.status == status)
            .map(|r| CaseLine::from(*r))
            .collect()
    };
    UnitSummary {
        school: school.clone(),
        total: counts.total(),
        sam_cases: lines(NutritionStatus::Sam),
        mam_cases: lines(NutritionStatus::Mam),
        children: unit.iter().map(|r| CaseLine::from(*r)).collect(),
        counts,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaFilter {
    #[default]
    All,
    Only(AreaType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgeGroup {
    #[default]
    All,
    /// 0–24 months inclusive.
    UpTo24,
    /// 25–60 months.
    Over24,
}

impl AreaFilter {
    pub fn matches(self, area: AreaType) -> bool {
        match self {
            AreaFilter::All => true,
            AreaFilter::Only(a) => a == area,
        }
    }
}

impl AgeGroup {
    pub fn matches(self, age_months: u32) -> bool {
        match self {
            AgeGroup::All => true,
            AgeGroup::UpTo24 => age_months <= YOUNG_CHILD_MAX_MONTHS,
            AgeGroup::Over24 => age_months > YOUNG_CHILD_MAX_MONTHS,
        }
    }
}

impl FromStr for AreaFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(AreaFilter::All);
        }
        s.parse().map(AreaFilter::Only)
    }
}

impl FromStr for AgeGroup {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(AgeGroup::All),
            "0-24" => Ok(AgeGroup::UpTo24),
            "25-60" => Ok(AgeGroup::Over24),
            other => Err(ParseEnumError {
                kind: "age group",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub area: AreaFilter,
    pub age: AgeGroup,
}

impl RecordFilter {
    pub fn matches(&self, r: &ChildRecord) -> bool {
        self.area.matches(r.area_type) && self.age.matches(r.age_months)
    }

    pub fn apply<'a>(&self, records: &'a [ChildRecord]) -> Vec<&'a ChildRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_prevalence(prevalence_percent: f64) -> Self {
        if prevalence_percent > HIGH_RISK_PREVALENCE {
            RiskLevel::High
        } else if prevalence_percent > MEDIUM_RISK_PREVALENCE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitPrevalence {
    pub school_id: String,
    pub name: String,
    pub area: AreaType,
    pub total: usize,
    /// Percent MAM + SAM, one decimal.
    pub prevalence: f64,
    pub risk: RiskLevel,
}

/// One row per unit, in unit order, over the filtered records.
pub fn prevalence_by_unit(
    records: &[ChildRecord],
    schools: &[School],
    filter: RecordFilter,
) -> Vec<UnitPrevalence> {
    let filtered = filter.apply(records);
    schools
        .iter()
        .map(|school| {
            let counts = StatusCounts::from_records(
                filtered.iter().copied().filter(|r| r.school_id == school.id),
            );
            let prevalence = counts.prevalence_percent();
            UnitPrevalence {
                school_id: school.id.clone(),
                name: school.name.clone(),
                area: school.area_type,
                total: counts.total(),
                prevalence,
                risk: RiskLevel::from_prevalence(prevalence),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictOverview {
    pub filter: RecordFilter,
    pub counts: StatusCounts,
    pub prevalence: f64,
    pub units: Vec<UnitPrevalence>,
}

pub fn district_overview(
    records: &[ChildRecord],
    schools: &[School],
    filter: RecordFilter,
) -> DistrictOverview {
    let counts = StatusCounts::from_records(filter.apply(records));
    log::debug!(
        "district overview: {} of {} records match {:?}",
        counts.total(),
        records.len(),
        filter
    );
    DistrictOverview {
        filter,
        prevalence: counts.prevalence_percent(),
        units: prevalence_by_unit(records, schools, filter),
        counts,
    }
}

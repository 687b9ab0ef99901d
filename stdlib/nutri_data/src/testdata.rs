//! Sample units and children for tests, benches and the CLI demo mode.
//!
//! The stored statuses and scores are hand-entered values from the field
//! sheets, not what the classifier computes today; call
//! [`ChildRecord::reclassify`] to bring them in line.

use chrono::NaiveDate;
use nutri_core::NutritionStatus;

use crate::record::{AreaType, ChildRecord, Gender, School};

pub fn school_factory(id: &str, name: &str, district: &str, area_type: AreaType) -> School {
    School {
        id: id.to_string(),
        name: name.to_string(),
        district: district.to_string(),
        area_type,
    }
}

pub fn sample_schools() -> Vec<School> {
    vec![
        school_factory("S1", "Anganwadi Center A", "Central", AreaType::Urban),
        school_factory("S2", "Anganwadi Center B", "Central", AreaType::Rural),
        school_factory("S3", "Primary School C", "North", AreaType::Rural),
        school_factory("S4", "Primary School D", "South", AreaType::Urban),
    ]
}

type Row = (
    &'static str,
    &'static str,
    u32,
    Gender,
    f64,
    f64,
    f64,
    NutritionStatus,
    f64,
    &'static str,
    AreaType,
    (i32, u32, u32),
);

#[rustfmt::skip]
const SAMPLE_ROWS: [Row; 8] = [
    ("1", "Aarav Kumar", 24, Gender::Male, 85.0, 10.5, 13.5, NutritionStatus::Normal, -0.5, "S1", AreaType::Urban, (2023, 10, 1)),
    ("2", "Ananya Singh", 36, Gender::Female, 92.0, 9.2, 11.2, NutritionStatus::Sam, -3.2, "S1", AreaType::Urban, (2023, 10, 5)),
    ("3", "Vihaan Sharma", 18, Gender::Male, 78.0, 8.5, 12.1, NutritionStatus::Mam, -2.1, "S2", AreaType::Rural, (2023, 11, 10)),
    ("4", "Ishani Gupta", 48, Gender::Female, 102.0, 15.0, 14.2, NutritionStatus::Normal, 0.2, "S2", AreaType::Rural, (2023, 11, 15)),
    ("5", "Aditya Patel", 12, Gender::Male, 72.0, 6.8, 11.4, NutritionStatus::Sam, -3.5, "S3", AreaType::Rural, (2023, 12, 1)),
    ("6", "Saanvi Reddy", 30, Gender::Female, 88.0, 11.0, 12.8, NutritionStatus::Normal, -1.2, "S3", AreaType::Rural, (2023, 12, 20)),
    ("7", "Reyansh Das", 42, Gender::Male, 98.0, 10.5, 11.8, NutritionStatus::Mam, -2.8, "S4", AreaType::Urban, (2024, 1, 5)),
    ("8", "Myra Khan", 54, Gender::Female, 108.0, 18.2, 15.5, NutritionStatus::Normal, 0.8, "S4", AreaType::Urban, (2024, 1, 25)),
];

pub fn sample_records() -> Vec<ChildRecord> {
    SAMPLE_ROWS
        .iter()
        .map(
            |&(id, name, age, gender, h, w, m, status, z, school, area, (y, mo, d))| ChildRecord {
                id: id.to_string(),
                name: name.to_string(),
                age_months: age,
                gender,
                height_cm: h,
                weight_kg: w,
                muac_cm: m,
                status,
                z_score: z,
                school_id: school.to_string(),
                area_type: area,
                timestamp: NaiveDate::from_ymd_opt(y, mo, d).expect("valid sample date"),
            },
        )
        .collect()
}

/// `n` synthetic children spread round-robin over `schools`.
pub fn synthetic_records(n: usize, schools: &[School]) -> Vec<ChildRecord> {
    let day0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    (0..n)
        .filter_map(|i| {
            let school = schools.get(i % schools.len().max(1))?;
            let height_cm = 65.0 + (i % 50) as f64;
            let weight_kg = 6.0 + ((i * 7) % 130) as f64 / 10.0;
            let muac_cm = 10.8 + ((i * 3) % 50) as f64 / 10.0;
            let c = nutri_core::classify(height_cm, weight_kg, muac_cm);
            Some(ChildRecord {
                id: format!("syn-{i}"),
                name: format!("Child {i}"),
                age_months: 6 + (i % 55) as u32,
                gender: if i % 2 == 0 { Gender::Male } else { Gender::Female },
                height_cm,
                weight_kg,
                muac_cm,
                status: c.status,
                z_score: c.z_score,
                school_id: school.id.clone(),
                area_type: school.area_type,
                timestamp: day0 + chrono::Days::new((i % 365) as u64),
            })
        })
        .collect()
}

//! Child-nutrition surveillance records built on `nutri_core`.
//!
//! - `record`: child and unit types, serialized with the dashboard's camelCase field names
//! - `entry`: raw form input to a classified submission
//! - `book`: the session's in-memory record list
//! - `summary`: per-unit dashboard and district prevalence with area/age filters
//! - `ndjson`: JSON / NDJSON import
//!
//! ```
//! use nutri_data::summary::{district_overview, RecordFilter, RiskLevel};
//! use nutri_data::testdata::{sample_records, sample_schools};
//!
//! let overview = district_overview(&sample_records(), &sample_schools(), RecordFilter::default());
//! assert_eq!(overview.counts.total(), 8);
//! assert_eq!(overview.units[0].prevalence, 50.0);
//! assert_eq!(overview.units[0].risk, RiskLevel::High);
//! ```

pub mod book;
pub mod entry;
pub mod ndjson;
pub mod record;
pub mod summary;
pub mod testdata;

pub use book::RecordBook;
pub use entry::{EntryError, EntryForm, UnknownSchoolPolicy};
pub use ndjson::{load_records, load_schools, LoadError};
pub use record::{AreaType, ChildRecord, Gender, NewChildRecord, School};
pub use summary::{
    district_overview, prevalence_by_unit, unit_summary, AgeGroup, AreaFilter, DistrictOverview,
    RecordFilter, RiskLevel, StatusCounts, UnitPrevalence, UnitSummary,
};

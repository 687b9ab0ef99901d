//! Anthropometric screening for child-nutrition surveillance.
//!
//! Classifies a child as `Normal`, `MAM` (moderate) or `SAM` (severe acute
//! malnutrition) from height, weight and mid-upper-arm circumference.
//!
//! ```
//! use nutri_core::{classify, NutritionStatus};
//!
//! let c = classify(92.0, 9.2, 11.2);
//! assert_eq!(c.status, NutritionStatus::Sam);
//! assert_eq!(c.status.badge_label(), "SAM (Severe)");
//! assert_eq!(c.z_score, -3.42);
//! ```
//!
//! Parsing form input:
//! ```
//! use nutri_core::{Measurement, NutritionStatus};
//!
//! let m = Measurement::parse("78", "8.5", "12.1").unwrap();
//! assert_eq!(m.classify().status, NutritionStatus::Mam);
//! ```

pub mod classify;
pub mod measurement;
pub mod status;
pub mod traits;

#[cfg(feature = "serde")]
pub use classify::score_serde;
pub use classify::{classify, classify_checked, Classification, ClassifyError};
pub use measurement::{Field, Measurement, MeasurementError};
pub use status::{NutritionStatus, ParseStatusError};
pub use traits::{Identifiable, Validatable, ValidationError};

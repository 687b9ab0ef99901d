//! In-memory list of units and child records for one session.

use chrono::NaiveDate;
use nutri_core::Identifiable;

use crate::record::{ChildRecord, NewChildRecord, School};

#[derive(Debug, Clone)]
pub struct RecordBook {
    schools: Vec<School>,
    /// Newest first.
    records: Vec<ChildRecord>,
    next_id: u64,
}

impl RecordBook {
    pub fn new(schools: Vec<School>, records: Vec<ChildRecord>) -> Self {
        // Continue after the highest numeric id already present; past
        // u64::MAX, start again from 1 and skip ids in use.
        let next_id = records
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n.checked_add(1).unwrap_or(1));
        Self {
            schools,
            records,
            next_id,
        }
    }

    /// Files a submission under a fresh id and puts it at the top of the list.
    pub fn add(&mut self, new: NewChildRecord, date: NaiveDate) -> &ChildRecord {
        let id = self.fresh_id();
        log::debug!("adding record {id} for unit {}", new.school_id);
        self.records.insert(0, ChildRecord::from_new(id, date, new));
        &self.records[0]
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.next_id.to_string();
            self.next_id = self.next_id.checked_add(1).unwrap_or(1);
            if !self.records.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }

    pub fn records(&self) -> &[ChildRecord] {
        &self.records
    }

    pub fn schools(&self) -> &[School] {
        &self.schools
    }

    pub fn school(&self, id: &str) -> Option<&School> {
        self.schools.iter().find(|s| s.id() == id)
    }

    pub fn records_for_school<'a>(
        &'a self,
        school_id: &'a str,
    ) -> impl Iterator<Item = &'a ChildRecord> + 'a {
        self.records.iter().filter(move |r| r.school_id == school_id)
    }

    /// Re-runs the classifier over every record; returns how many changed.
    pub fn reclassify_all(&mut self) -> usize {
        let changed = self
            .records
            .iter_mut()
            .map(ChildRecord::reclassify)
            .filter(|&c| c)
            .count();
        if changed > 0 {
            log::info!("reclassified {changed} of {} records", self.records.len());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryForm;
    use crate::testdata::{sample_records, sample_schools};
    use nutri_core::NutritionStatus;

    fn book() -> RecordBook {
        RecordBook::new(sample_schools(), sample_records())
    }

    #[test]
    fn new_records_go_first_with_fresh_ids() {
        let mut book = book();
        let form = EntryForm {
            name: "Kabir Joshi".into(),
            age_months: "20".into(),
            gender: "male".into(),
            height_cm: "80".into(),
            weight_kg: "9.0".into(),
            muac_cm: "11.9".into(),
            school_id: "S1".into(),
        };
        let new = form.submit(book.schools()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let added = book.add(new.clone(), date);
        assert_eq!(added.id, "9");
        assert_eq!(added.timestamp, date);
        assert_eq!(book.records()[0].name, "Kabir Joshi");
        assert_eq!(book.records().len(), 9);

        let second = book.add(new, date);
        assert_eq!(second.id, "10");
    }

    #[test]
    fn empty_book_starts_at_one() {
        let mut book = RecordBook::new(sample_schools(), Vec::new());
        let form = EntryForm {
            name: "A".into(),
            age_months: "12".into(),
            gender: "f".into(),
            height_cm: "70".into(),
            weight_kg: "8".into(),
            muac_cm: "13".into(),
            school_id: "S2".into(),
        };
        let new = form.submit(book.schools()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(book.add(new, date).id, "1");
    }

    #[test]
    fn ids_wrap_past_the_largest_u64_without_reuse() {
        let mut records = sample_records();
        records[0].id = u64::MAX.to_string();
        let mut book = RecordBook::new(sample_schools(), records);
        let form = EntryForm {
            name: "Kabir Joshi".into(),
            age_months: "20".into(),
            gender: "male".into(),
            height_cm: "80".into(),
            weight_kg: "9.0".into(),
            muac_cm: "11.9".into(),
            school_id: "S1".into(),
        };
        let new = form.submit(book.schools()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        // "1" was freed by the rename; "2" to "8" are taken.
        assert_eq!(book.add(new.clone(), date).id, "1");
        assert_eq!(book.add(new, date).id, "9");
        assert_eq!(book.records().len(), 10);
    }

    #[test]
    fn filters_by_school() {
        let book = book();
        let ids: Vec<&str> = book.records_for_school("S4").map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "8"]);
        assert_eq!(book.school("S2").map(|s| s.name.as_str()), Some("Anganwadi Center B"));
        assert!(book.school("S9").is_none());
    }

    #[test]
    fn reclassify_all_fixes_stale_scores() {
        let mut book = book();
        // Every sample row carries a hand-entered score.
        assert_eq!(book.reclassify_all(), 8);
        assert_eq!(book.reclassify_all(), 0);
        let reyansh = book.records().iter().find(|r| r.id == "7").unwrap();
        assert_eq!(reyansh.status, NutritionStatus::Sam);
    }
}

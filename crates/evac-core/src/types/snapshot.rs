//! The full registry state and its change notification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::assignment::Assignment;
use super::citizen::Citizen;
use super::kind::CollectionKind;
use super::record::Record;
use super::shelter::Shelter;
use super::table::Table;
use crate::hash::{FxHashMap, fx_hash_map};

/// All three collections at a point in time.
///
/// Collections keep insertion order. This is also the persisted form: a
/// snapshot is always saved whole, never field by field.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use evac_core::{Assignment, Snapshot};
///
/// let today = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
/// let mut snapshot = Snapshot::default();
/// snapshot.assignments.push(Assignment::new("C001", "S001", today));
/// snapshot.assignments.push(Assignment::new("C002", "S001", today));
///
/// assert_eq!(snapshot.occupancy("S001"), 2);
/// assert_eq!(snapshot.assignment_for("C002").unwrap().shelter_id, "S001");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Registered citizens.
    pub citizens: Vec<Citizen>,

    /// Shelters.
    pub shelters: Vec<Shelter>,

    /// Current placements, at most one per citizen.
    pub assignments: Vec<Assignment>,
}

impl Snapshot {
    /// Returns `true` if all three collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty() && self.shelters.is_empty() && self.assignments.is_empty()
    }

    /// Finds a record by id in its collection.
    #[must_use]
    pub fn find<R: Record>(&self, id: &str) -> Option<&R> {
        R::collection(self).iter().find(|r| r.id() == id)
    }

    /// Finds a citizen by id.
    #[must_use]
    pub fn citizen(&self, citizen_id: &str) -> Option<&Citizen> {
        self.find(citizen_id)
    }

    /// Finds a shelter by id.
    #[must_use]
    pub fn shelter(&self, shelter_id: &str) -> Option<&Shelter> {
        self.find(shelter_id)
    }

    /// Returns the citizen's assignment, if they have one.
    #[must_use]
    pub fn assignment_for(&self, citizen_id: &str) -> Option<&Assignment> {
        self.find(citizen_id)
    }

    /// Counts assignments referencing `shelter_id`.
    #[must_use]
    pub fn occupancy(&self, shelter_id: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.shelter_id == shelter_id)
            .count()
    }

    /// Counts assignments per shelter id in a single pass.
    ///
    /// Shelters with no assignments are absent from the map.
    #[must_use]
    pub fn occupancy_by_shelter(&self) -> FxHashMap<&str, usize> {
        let mut counts = fx_hash_map();
        for assignment in &self.assignments {
            *counts.entry(assignment.shelter_id.as_str()).or_default() += 1;
        }
        counts
    }

    /// Projects `kind`'s collection onto its fixed field list.
    #[must_use]
    pub fn to_table(&self, kind: CollectionKind) -> Table {
        match kind {
            CollectionKind::Citizens => self.table_of::<Citizen>(),
            CollectionKind::Shelters => self.table_of::<Shelter>(),
            CollectionKind::Assignments => self.table_of::<Assignment>(),
        }
    }

    fn table_of<R: Record>(&self) -> Table {
        let mut table = Table::for_kind(R::KIND);
        for record in R::collection(self) {
            table.push_row(record.to_fields());
        }
        table
    }
}

/// Notification that the snapshot changed.
///
/// Carries the complete state at `revision`, so a subscriber never needs to
/// read back from the store and later events supersede earlier ones.
#[derive(Debug, Clone)]
pub struct SnapshotChanged {
    /// Monotonic counter, incremented once per committed mutation.
    pub revision: u64,

    /// The state after the mutation.
    pub snapshot: Arc<Snapshot>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    fn sample() -> Snapshot {
        Snapshot {
            citizens: vec![],
            shelters: vec![Shelter {
                shelter_id: "S001".to_owned(),
                name: "Gym, east wing".to_owned(),
                capacity: 6,
                risk_level: "Low".to_owned(),
            }],
            assignments: vec![
                Assignment::new("C001", "S001", today()),
                Assignment::new("C002", "S002", today()),
                Assignment::new("C003", "S001", today()),
            ],
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.citizens.is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn test_occupancy_by_shelter() {
        let snapshot = sample();
        let counts = snapshot.occupancy_by_shelter();
        assert_eq!(counts.get("S001"), Some(&2));
        assert_eq!(counts.get("S002"), Some(&1));
        assert_eq!(snapshot.occupancy("S003"), 0);
    }

    #[test]
    fn test_lookup_by_id() {
        let snapshot = sample();
        assert_eq!(snapshot.shelter("S001").map(|s| s.capacity), Some(6));
        assert!(snapshot.shelter("S404").is_none());
        assert!(snapshot.citizen("C001").is_none());
    }

    #[test]
    fn test_to_table_projects_fields() {
        let table = sample().to_table(CollectionKind::Shelters);
        insta::assert_json_snapshot!(table, @r#"
        {
          "headers": [
            "shelterId",
            "name",
            "capacity",
            "riskLevel"
          ],
          "rows": [
            [
              "S001",
              "Gym, east wing",
              "6",
              "Low"
            ]
          ]
        }
        "#);
    }

    #[test]
    fn test_deserialize_missing_collections() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"shelters": []}"#).unwrap();
        assert!(snapshot.is_empty());
    }
}

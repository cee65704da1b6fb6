//! Demonstration dataset for a registry with no stored snapshot.

use chrono::NaiveDate;

use crate::types::{Assignment, Citizen, Shelter, Snapshot};

/// Returns the current local date.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn shelter(id: &str, name: &str, capacity: u32, risk_level: &str) -> Shelter {
    Shelter {
        shelter_id: id.to_owned(),
        name: name.to_owned(),
        capacity,
        risk_level: risk_level.to_owned(),
    }
}

fn citizen(
    id: &str,
    name: &str,
    age: u32,
    health_status: &str,
    citizen_type: &str,
    register_date: NaiveDate,
) -> Citizen {
    Citizen {
        citizen_id: id.to_owned(),
        name: name.to_owned(),
        age: Some(age),
        health_status: health_status.to_owned(),
        register_date,
        citizen_type: citizen_type.to_owned(),
    }
}

/// Builds the demonstration dataset, dated `today`.
///
/// Five shelters, three citizens, and one assignment (C002 in S001).
///
/// # Examples
///
/// ```
/// use evac_core::{demo_snapshot, today};
///
/// let snapshot = demo_snapshot(today());
/// assert_eq!(snapshot.shelters.len(), 5);
/// assert_eq!(snapshot.citizens.len(), 3);
/// assert_eq!(snapshot.occupancy("S001"), 1);
/// ```
#[must_use]
pub fn demo_snapshot(today: NaiveDate) -> Snapshot {
    Snapshot {
        shelters: vec![
            shelter("S001", "ศูนย์กีฬาเขต 1", 6, "Low"),
            shelter("S002", "โรงเรียนเทศบาล 2", 5, "Medium"),
            shelter("S003", "วัดกลาง", 7, "Low"),
            shelter("S004", "ศูนย์การศึกษาจังหวัด", 5, "Low"),
            shelter("S005", "โรงแรมพักอาศัย", 8, "Medium"),
        ],
        citizens: vec![
            citizen("C001", "Aom", 19, "Healthy", "ทั่วไป", today),
            citizen("C002", "Boss", 70, "Chronic", "กลุ่มเสี่ยง", today),
            citizen("C003", "Chet", 28, "Injured", "VIP", today),
        ],
        assignments: vec![Assignment::new("C002", "S001", today)],
    }
}

impl Snapshot {
    /// Replaces the contents with the demonstration dataset, but only if all
    /// three collections are empty.
    ///
    /// Returns `true` if the snapshot was seeded.
    pub fn seed_if_empty(&mut self, today: NaiveDate) -> bool {
        if !self.is_empty() {
            return false;
        }
        *self = demo_snapshot(today);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RulesConfig;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    #[test]
    fn test_seed_references_are_valid() {
        let snapshot = demo_snapshot(day());
        for assignment in &snapshot.assignments {
            assert!(snapshot.citizen(&assignment.citizen_id).is_some());
            assert!(snapshot.shelter(&assignment.shelter_id).is_some());
        }
    }

    #[test]
    fn test_seed_priority_marker_matches_rules() {
        let snapshot = demo_snapshot(day());
        let rules = RulesConfig::default();
        let boss = snapshot.citizen("C002").unwrap();
        assert_eq!(boss.citizen_type, rules.priority_citizen_type);
    }

    #[test]
    fn test_seed_if_empty_only_seeds_once() {
        let mut snapshot = Snapshot::default();
        assert!(snapshot.seed_if_empty(day()));
        snapshot.citizens.clear();
        assert!(!snapshot.seed_if_empty(day()));
        assert!(snapshot.citizens.is_empty());
    }
}

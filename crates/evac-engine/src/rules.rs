//! Assignment rules: may this citizen be placed in this shelter?
//!
//! [`propose_assignment`] is a pure function over a [`Snapshot`]. It never
//! mutates anything; on success it returns a [`Placement`] for the caller to
//! apply.
//!
//! # Check Order
//!
//! Checks run in a fixed order and the first failure is reported, so the
//! operator always sees the same reason for the same situation:
//!
//! 1. the citizen exists ([`Rejection::UnknownCitizen`])
//! 2. the shelter exists ([`Rejection::UnknownShelter`])
//! 3. the shelter has a free slot ([`Rejection::ShelterFull`])
//! 4. risky-health citizens only go to low-risk shelters
//!    ([`Rejection::RiskyHealthRequiresLowRisk`])
//! 5. the last reserved slots go to priority citizens only
//!    ([`Rejection::ReservedForPriority`])
//!
//! # Occupancy
//!
//! Occupancy never counts the citizen's own assignment. A citizen who already
//! holds a slot in the target shelter is re-confirming, not taking a new slot,
//! so checks 3 and 5 do not apply to them; check 4 still does.

use chrono::NaiveDate;
use evac_core::{Citizen, RulesConfig, Shelter, Snapshot};
use serde::{Deserialize, Serialize};

/// Why a placement was refused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// No citizen has the proposed id.
    #[error("no citizen with this id is registered")]
    UnknownCitizen,

    /// No shelter has the proposed id.
    #[error("no shelter with this id is registered")]
    UnknownShelter,

    /// Every slot in the shelter is taken.
    #[error("the shelter is full")]
    ShelterFull,

    /// The citizen's health status restricts them to a low-risk shelter.
    #[error("citizens with a risky health status may only go to a low-risk shelter")]
    RiskyHealthRequiresLowRisk,

    /// Only reserved slots remain and the citizen is not a priority citizen.
    #[error(
        "the shelter is nearly full; remaining places are reserved for children, elders and the at-risk group"
    )]
    ReservedForPriority,
}

/// An accepted placement, ready to be applied to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Citizen being placed.
    pub citizen_id: String,

    /// Target shelter.
    pub shelter_id: String,

    /// Check-in date to record.
    pub check_in_date: NaiveDate,

    /// The shelter the citizen held before, if any.
    pub previous_shelter: Option<String>,
}

impl Placement {
    /// Returns `true` if the citizen had no assignment before.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.previous_shelter.is_none()
    }

    /// Returns `true` if the citizen moves from another shelter.
    #[must_use]
    pub fn is_move(&self) -> bool {
        self.previous_shelter
            .as_deref()
            .is_some_and(|previous| previous != self.shelter_id)
    }

    /// Returns `true` if the citizen is re-confirmed in the shelter they hold.
    #[must_use]
    pub fn is_reconfirmation(&self) -> bool {
        self.previous_shelter.as_deref() == Some(self.shelter_id.as_str())
    }
}

/// The configured rule thresholds, with the predicates built on them.
///
/// # Examples
///
/// ```
/// use evac_core::RulesConfig;
/// use evac_engine::AssignmentPolicy;
///
/// let policy = AssignmentPolicy::new(RulesConfig::default());
/// assert!(policy.is_priority_age(Some(11)));
/// assert!(policy.is_priority_age(Some(60)));
/// assert!(!policy.is_priority_age(Some(30)));
/// assert!(!policy.is_priority_age(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPolicy {
    rules: RulesConfig,
}

impl AssignmentPolicy {
    /// Creates a policy from rule configuration.
    #[must_use]
    pub const fn new(rules: RulesConfig) -> Self {
        Self { rules }
    }

    /// Returns the underlying configuration.
    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Returns `true` for ages under the child threshold or at or over the
    /// elder threshold. An unknown age is not a priority age.
    #[must_use]
    pub fn is_priority_age(&self, age: Option<u32>) -> bool {
        age.is_some_and(|age| age < self.rules.child_age_below || age >= self.rules.elder_age_from)
    }

    /// Returns `true` if `citizen` is entitled to reserved slots.
    #[must_use]
    pub fn is_priority(&self, citizen: &Citizen) -> bool {
        self.is_priority_age(citizen.age) || citizen.citizen_type == self.rules.priority_citizen_type
    }

    /// Returns `true` if `citizen` may only go to a low-risk shelter.
    #[must_use]
    pub fn has_risky_health(&self, citizen: &Citizen) -> bool {
        self.rules.is_risky_health(&citizen.health_status)
    }

    /// Returns `true` if `shelter` may host risky-health citizens.
    #[must_use]
    pub fn is_low_risk(&self, shelter: &Shelter) -> bool {
        shelter.risk_level == self.rules.low_risk_level
    }

    /// Returns the number of free slots held back for priority citizens.
    #[must_use]
    pub fn reserved_slots(&self) -> usize {
        usize::try_from(self.rules.reserved_slots).unwrap_or(usize::MAX)
    }
}

impl From<RulesConfig> for AssignmentPolicy {
    fn from(rules: RulesConfig) -> Self {
        Self::new(rules)
    }
}

/// Decides whether `citizen_id` may be placed in `shelter_id`.
///
/// Ids are matched exactly; callers trim them first.
///
/// # Errors
///
/// Returns the first failing [`Rejection`], in the order described in the
/// [module documentation](self).
///
/// # Examples
///
/// ```
/// use evac_core::{demo_snapshot, today};
/// use evac_engine::{AssignmentPolicy, Rejection, propose_assignment};
///
/// let snapshot = demo_snapshot(today());
/// let policy = AssignmentPolicy::default();
///
/// // C003 is injured; S002 is a medium-risk shelter.
/// let result = propose_assignment(&snapshot, &policy, "C003", "S002", today());
/// assert_eq!(result, Err(Rejection::RiskyHealthRequiresLowRisk));
///
/// let placement = propose_assignment(&snapshot, &policy, "C003", "S003", today()).unwrap();
/// assert!(placement.is_new());
/// ```
pub fn propose_assignment(
    snapshot: &Snapshot,
    policy: &AssignmentPolicy,
    citizen_id: &str,
    shelter_id: &str,
    check_in_date: NaiveDate,
) -> Result<Placement, Rejection> {
    let citizen = snapshot
        .citizen(citizen_id)
        .ok_or(Rejection::UnknownCitizen)?;
    let shelter = snapshot
        .shelter(shelter_id)
        .ok_or(Rejection::UnknownShelter)?;

    // An imported snapshot may hold several assignments per citizen.
    let holds_slot_here = snapshot
        .assignments
        .iter()
        .any(|a| a.citizen_id == citizen_id && a.shelter_id == shelter_id);
    let previous_shelter = if holds_slot_here {
        Some(shelter.shelter_id.clone())
    } else {
        snapshot
            .assignment_for(citizen_id)
            .map(|a| a.shelter_id.clone())
    };

    let capacity = usize::try_from(shelter.capacity).unwrap_or(usize::MAX);
    let occupancy = snapshot
        .assignments
        .iter()
        .filter(|a| a.shelter_id == shelter_id && !(holds_slot_here && a.citizen_id == citizen_id))
        .count();

    if !holds_slot_here && occupancy >= capacity {
        return Err(Rejection::ShelterFull);
    }

    if policy.has_risky_health(citizen) && !policy.is_low_risk(shelter) {
        return Err(Rejection::RiskyHealthRequiresLowRisk);
    }

    let free = capacity.saturating_sub(occupancy);
    if !holds_slot_here && !policy.is_priority(citizen) && free <= policy.reserved_slots() {
        return Err(Rejection::ReservedForPriority);
    }

    Ok(Placement {
        citizen_id: citizen.citizen_id.clone(),
        shelter_id: shelter.shelter_id.clone(),
        check_in_date,
        previous_shelter,
    })
}

#[cfg(test)]
mod tests {
    use evac_core::Assignment;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    fn citizen(id: &str, age: Option<u32>, health: &str, kind: &str) -> Citizen {
        Citizen {
            citizen_id: id.to_owned(),
            name: id.to_owned(),
            age,
            health_status: health.to_owned(),
            register_date: day(),
            citizen_type: kind.to_owned(),
        }
    }

    fn shelter(id: &str, capacity: u32, risk: &str) -> Shelter {
        Shelter {
            shelter_id: id.to_owned(),
            name: id.to_owned(),
            capacity,
            risk_level: risk.to_owned(),
        }
    }

    /// A shelter `S1` of `capacity` with `occupied` filler citizens in it.
    fn shelter_with(capacity: u32, occupied: usize, risk: &str) -> Snapshot {
        let mut snapshot = Snapshot {
            shelters: vec![shelter("S1", capacity, risk), shelter("S2", 10, "Low")],
            ..Snapshot::default()
        };
        for i in 0..occupied {
            let id = format!("F{i}");
            snapshot.citizens.push(citizen(&id, Some(40), "Healthy", ""));
            snapshot.assignments.push(Assignment::new(id, "S1", day()));
        }
        snapshot
    }

    fn propose(snapshot: &Snapshot, citizen_id: &str, shelter_id: &str) -> Result<Placement, Rejection> {
        propose_assignment(snapshot, &AssignmentPolicy::default(), citizen_id, shelter_id, day())
    }

    #[test]
    fn test_unknown_citizen_checked_first() {
        let snapshot = shelter_with(0, 0, "Medium");
        assert_eq!(propose(&snapshot, "NOPE", "NOPE"), Err(Rejection::UnknownCitizen));
    }

    #[test]
    fn test_unknown_shelter() {
        let mut snapshot = shelter_with(5, 0, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Healthy", ""));
        assert_eq!(propose(&snapshot, "C1", "S404"), Err(Rejection::UnknownShelter));
    }

    #[test]
    fn test_full_shelter_rejects_priority_too() {
        let mut snapshot = shelter_with(3, 3, "Low");
        snapshot.citizens.push(citizen("C1", Some(5), "Healthy", ""));
        assert_eq!(propose(&snapshot, "C1", "S1"), Err(Rejection::ShelterFull));
    }

    #[test]
    fn test_zero_capacity_is_full() {
        let mut snapshot = shelter_with(0, 0, "Low");
        snapshot.citizens.push(citizen("C1", Some(80), "Healthy", ""));
        assert_eq!(propose(&snapshot, "C1", "S1"), Err(Rejection::ShelterFull));
    }

    #[test]
    fn test_full_reported_before_health() {
        let mut snapshot = shelter_with(1, 1, "Medium");
        snapshot.citizens.push(citizen("C1", Some(80), "Chronic", ""));
        assert_eq!(propose(&snapshot, "C1", "S1"), Err(Rejection::ShelterFull));
    }

    #[test]
    fn test_risky_health_needs_low_risk() {
        for status in ["Chronic", "Injured", "Disabled"] {
            let mut snapshot = shelter_with(50, 0, "Medium");
            snapshot.citizens.push(citizen("C1", Some(70), status, ""));
            assert_eq!(
                propose(&snapshot, "C1", "S1"),
                Err(Rejection::RiskyHealthRequiresLowRisk),
                "status {status}"
            );
        }
    }

    #[test]
    fn test_risky_health_accepted_in_low_risk() {
        let mut snapshot = shelter_with(50, 0, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Injured", ""));
        assert!(propose(&snapshot, "C1", "S1").is_ok());
    }

    #[test]
    fn test_health_reported_before_reservation() {
        let mut snapshot = shelter_with(2, 1, "Medium");
        snapshot.citizens.push(citizen("C1", Some(30), "Disabled", ""));
        assert_eq!(
            propose(&snapshot, "C1", "S1"),
            Err(Rejection::RiskyHealthRequiresLowRisk)
        );
    }

    #[test]
    fn test_last_slot_reserved_for_priority() {
        let mut snapshot = shelter_with(6, 5, "Low");
        snapshot.citizens.push(citizen("ADULT", Some(30), "Healthy", "ทั่วไป"));
        snapshot.citizens.push(citizen("CHILD", Some(11), "Healthy", ""));
        snapshot.citizens.push(citizen("ELDER", Some(60), "Healthy", ""));
        snapshot.citizens.push(citizen("GROUP", Some(30), "Healthy", "กลุ่มเสี่ยง"));

        assert_eq!(propose(&snapshot, "ADULT", "S1"), Err(Rejection::ReservedForPriority));
        assert!(propose(&snapshot, "CHILD", "S1").is_ok());
        assert!(propose(&snapshot, "ELDER", "S1").is_ok());
        assert!(propose(&snapshot, "GROUP", "S1").is_ok());
    }

    #[test]
    fn test_unknown_age_is_not_priority() {
        let mut snapshot = shelter_with(6, 5, "Low");
        snapshot.citizens.push(citizen("C1", None, "Healthy", ""));
        assert_eq!(propose(&snapshot, "C1", "S1"), Err(Rejection::ReservedForPriority));
    }

    #[test]
    fn test_two_free_slots_open_to_everyone() {
        let mut snapshot = shelter_with(6, 4, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Healthy", ""));
        assert!(propose(&snapshot, "C1", "S1").is_ok());
    }

    #[test]
    fn test_capacity_one_only_priority() {
        let mut snapshot = shelter_with(1, 0, "Low");
        snapshot.citizens.push(citizen("ADULT", Some(30), "Healthy", ""));
        snapshot.citizens.push(citizen("ELDER", Some(75), "Healthy", ""));
        assert_eq!(propose(&snapshot, "ADULT", "S1"), Err(Rejection::ReservedForPriority));
        assert!(propose(&snapshot, "ELDER", "S1").is_ok());
    }

    #[test]
    fn test_reserved_slots_configurable() {
        let mut snapshot = shelter_with(6, 4, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Healthy", ""));
        let policy = AssignmentPolicy::new(RulesConfig {
            reserved_slots: 2,
            ..RulesConfig::default()
        });
        assert_eq!(
            propose_assignment(&snapshot, &policy, "C1", "S1", day()),
            Err(Rejection::ReservedForPriority)
        );
    }

    #[test]
    fn test_move_reports_previous_shelter() {
        let mut snapshot = shelter_with(6, 0, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Healthy", ""));
        snapshot.assignments.push(Assignment::new("C1", "S2", day()));

        let placement = propose(&snapshot, "C1", "S1").unwrap();
        assert!(placement.is_move());
        assert_eq!(placement.previous_shelter.as_deref(), Some("S2"));
    }

    #[test]
    fn test_reconfirmation_in_full_shelter_accepted() {
        let mut snapshot = shelter_with(3, 2, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Healthy", ""));
        snapshot.assignments.push(Assignment::new("C1", "S1", day()));

        let placement = propose(&snapshot, "C1", "S1").unwrap();
        assert!(placement.is_reconfirmation());
        assert!(!placement.is_new());
        assert!(!placement.is_move());
    }

    #[test]
    fn test_reconfirmation_above_capacity_accepted() {
        // Capacity lowered beneath occupancy after the fact.
        let mut snapshot = shelter_with(1, 3, "Low");
        snapshot.citizens.push(citizen("C1", Some(30), "Healthy", ""));
        snapshot.assignments.push(Assignment::new("C1", "S1", day()));
        assert!(propose(&snapshot, "C1", "S1").is_ok());
    }

    #[test]
    fn test_reconfirmation_still_checks_health() {
        let mut snapshot = shelter_with(10, 0, "Medium");
        snapshot.citizens.push(citizen("C1", Some(30), "Chronic", ""));
        snapshot.assignments.push(Assignment::new("C1", "S1", day()));
        assert_eq!(
            propose(&snapshot, "C1", "S1"),
            Err(Rejection::RiskyHealthRequiresLowRisk)
        );
    }

    #[test]
    fn test_rejection_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Rejection::ReservedForPriority).unwrap(),
            "\"reserved_for_priority\""
        );
    }

    #[test]
    fn test_slot_held_by_later_assignment_is_reconfirmation() {
        let mut snapshot = shelter_with(2, 1, "Low");
        snapshot.citizens.push(citizen("C1", Some(70), "Healthy", ""));
        snapshot.assignments.insert(0, Assignment::new("C1", "S2", day()));
        snapshot.assignments.push(Assignment::new("C1", "S1", day()));

        let placement = propose(&snapshot, "C1", "S1").unwrap();
        assert!(placement.is_reconfirmation());

        snapshot.assignments.pop();
        snapshot.citizens.push(citizen("F9", Some(40), "Healthy", ""));
        snapshot.assignments.push(Assignment::new("F9", "S1", day()));
        assert_eq!(propose(&snapshot, "C1", "S1"), Err(Rejection::ShelterFull));
    }
}

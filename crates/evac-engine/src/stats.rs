//! Occupancy and summary views for status reports.

use evac_core::{FxHashSet, Shelter, fx_hash_set};
use serde::Serialize;

use crate::registry::Registry;

/// Capacity and occupancy of one shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelterOccupancy {
    /// Shelter id.
    pub shelter_id: String,
    /// Shelter name.
    pub name: String,
    /// Risk level label.
    pub risk_level: String,
    /// Configured capacity.
    pub capacity: usize,
    /// Assignments referencing the shelter.
    pub occupancy: usize,
}

impl ShelterOccupancy {
    fn new(shelter: &Shelter, occupancy: usize) -> Self {
        Self {
            shelter_id: shelter.shelter_id.clone(),
            name: shelter.name.clone(),
            risk_level: shelter.risk_level.clone(),
            capacity: usize::try_from(shelter.capacity).unwrap_or(usize::MAX),
            occupancy,
        }
    }

    /// Slots still open.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.occupancy)
    }

    /// Returns `true` if no slot is open.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }

    /// Imports and capacity edits can leave a shelter holding more than it
    /// should.
    #[must_use]
    pub fn is_over_capacity(&self) -> bool {
        self.occupancy > self.capacity
    }
}

/// Collection sizes and placement totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    /// Registered citizens.
    pub citizens: usize,
    /// Registered shelters.
    pub shelters: usize,
    /// Stored assignments.
    pub assignments: usize,
    /// Registered citizens holding an assignment.
    pub assigned: usize,
    /// Registered citizens without one.
    pub unassigned: usize,
    /// Sum of shelter capacities.
    pub total_capacity: usize,
    /// Sum of open slots across shelters.
    pub free_slots: usize,
}

impl Registry {
    /// Returns every shelter's occupancy, in shelter order.
    #[must_use]
    pub fn occupancy(&self) -> Vec<ShelterOccupancy> {
        let snapshot = self.snapshot();
        let counts = snapshot.occupancy_by_shelter();
        snapshot
            .shelters
            .iter()
            .map(|s| ShelterOccupancy::new(s, counts.get(s.shelter_id.as_str()).copied().unwrap_or(0)))
            .collect()
    }

    /// Returns summary counts over the whole registry.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let snapshot = self.snapshot();
        let placed: FxHashSet<&str> = {
            let mut set = fx_hash_set();
            set.extend(snapshot.assignments.iter().map(|a| a.citizen_id.as_str()));
            set
        };
        let assigned = snapshot
            .citizens
            .iter()
            .filter(|c| placed.contains(c.citizen_id.as_str()))
            .count();

        let occupancy = self.occupancy();
        RegistryStats {
            citizens: snapshot.citizens.len(),
            shelters: snapshot.shelters.len(),
            assignments: snapshot.assignments.len(),
            assigned,
            unassigned: snapshot.citizens.len() - assigned,
            total_capacity: occupancy.iter().map(|o| o.capacity).sum(),
            free_slots: occupancy.iter().map(ShelterOccupancy::free_slots).sum(),
        }
    }
}

//! Validated add, delete, assign, and reset operations over the record store.

use chrono::NaiveDate;
use evac_core::{
    Assignment, Citizen, CollectionKind, NewCitizen, NewShelter, Shelter, Snapshot,
    ValidationError, demo_snapshot,
};
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::rules::{AssignmentPolicy, Placement, propose_assignment};
use crate::store::RecordStore;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// The evacuation registry.
///
/// Owns the [`RecordStore`] and the [`AssignmentPolicy`]. Every operation
/// runs to completion synchronously; a refused operation leaves the store
/// untouched and emits nothing.
///
/// # Examples
///
/// ```
/// use evac_core::{NewCitizen, demo_snapshot, today};
/// use evac_engine::{Registry, RecordStore};
///
/// let mut registry = Registry::new(RecordStore::new(demo_snapshot(today())), Default::default());
///
/// registry
///     .add_citizen(NewCitizen {
///         citizen_id: "C010".into(),
///         name: "Dao".into(),
///         age: "8".into(),
///         health_status: "Healthy".into(),
///         ..Default::default()
///     })
///     .unwrap();
///
/// let placement = registry.assign("C010", "S003", None).unwrap();
/// assert!(placement.is_new());
/// assert_eq!(registry.snapshot().occupancy("S003"), 1);
/// ```
#[derive(Debug)]
pub struct Registry {
    store: RecordStore,
    policy: AssignmentPolicy,
    fixed_date: Option<NaiveDate>,
}

impl Registry {
    /// Creates a registry over `store`, judging placements with `policy`.
    #[must_use]
    pub fn new(store: RecordStore, policy: AssignmentPolicy) -> Self {
        Self {
            store,
            policy,
            fixed_date: None,
        }
    }

    /// Pins the date used for blank register and check-in dates.
    #[must_use]
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    /// Returns the record store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Returns the record store mutably, e.g. to subscribe to changes.
    #[inline]
    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// Returns the current snapshot.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    /// Returns the assignment policy.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &AssignmentPolicy {
        &self.policy
    }

    /// Returns the date treated as today.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(evac_core::today)
    }

    /// Registers a citizen.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingId`] for a blank id
    /// - [`RegistryError::DuplicateId`] if the id is taken
    /// - [`ValidationError::InvalidNumber`] / [`ValidationError::InvalidDate`]
    ///   for a bad age or register date
    pub fn add_citizen(&mut self, payload: NewCitizen) -> Result<Citizen> {
        let id = payload.citizen_id();
        if id.is_empty() {
            return Err(ValidationError::MissingId { field: "citizenId" }.into());
        }
        if self.snapshot().citizen(id).is_some() {
            return Err(RegistryError::duplicate(CollectionKind::Citizens, id));
        }

        let citizen = payload.into_citizen(self.today())?;
        info!(citizen_id = %citizen.citizen_id, "Citizen added");
        self.store
            .apply("add_citizen", |s| s.citizens.push(citizen.clone()));
        Ok(citizen)
    }

    /// Registers a shelter.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingId`] for a blank id
    /// - [`RegistryError::DuplicateId`] if the id is taken
    /// - [`ValidationError::InvalidNumber`] for a non-numeric capacity
    pub fn add_shelter(&mut self, payload: NewShelter) -> Result<Shelter> {
        let id = payload.shelter_id();
        if id.is_empty() {
            return Err(ValidationError::MissingId { field: "shelterId" }.into());
        }
        if self.snapshot().shelter(id).is_some() {
            return Err(RegistryError::duplicate(CollectionKind::Shelters, id));
        }

        let shelter = payload.into_shelter()?;
        info!(shelter_id = %shelter.shelter_id, capacity = shelter.capacity, "Shelter added");
        self.store
            .apply("add_shelter", |s| s.shelters.push(shelter.clone()));
        Ok(shelter)
    }

    /// Removes a citizen and their assignment.
    ///
    /// Returns the number of assignments removed with it.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingId`] for a blank id, [`RegistryError::NotFound`]
    /// if no citizen has it.
    pub fn delete_citizen(&mut self, citizen_id: &str) -> Result<usize> {
        let id = required(citizen_id, "citizenId")?;
        if self.snapshot().citizen(id).is_none() {
            return Err(RegistryError::not_found(CollectionKind::Citizens, id));
        }

        let cascaded = self.store.apply("delete_citizen", |s| {
            s.citizens.retain(|c| c.citizen_id != id);
            drain_assignments(s, |a| a.citizen_id == id)
        });
        info!(citizen_id = id, cascaded, "Citizen deleted");
        Ok(cascaded)
    }

    /// Removes a shelter and every assignment to it.
    ///
    /// Returns the number of assignments removed with it.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingId`] for a blank id, [`RegistryError::NotFound`]
    /// if no shelter has it.
    pub fn delete_shelter(&mut self, shelter_id: &str) -> Result<usize> {
        let id = required(shelter_id, "shelterId")?;
        if self.snapshot().shelter(id).is_none() {
            return Err(RegistryError::not_found(CollectionKind::Shelters, id));
        }

        let cascaded = self.store.apply("delete_shelter", |s| {
            s.shelters.retain(|sh| sh.shelter_id != id);
            drain_assignments(s, |a| a.shelter_id == id)
        });
        info!(shelter_id = id, cascaded, "Shelter deleted");
        Ok(cascaded)
    }

    /// Checks a placement without applying it.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Rejected`] with the first failing rule.
    pub fn propose(
        &self,
        citizen_id: &str,
        shelter_id: &str,
        check_in_date: Option<NaiveDate>,
    ) -> Result<Placement> {
        let citizen_id = citizen_id.trim();
        let shelter_id = shelter_id.trim();
        let date = check_in_date.unwrap_or_else(|| self.today());
        propose_assignment(self.snapshot(), &self.policy, citizen_id, shelter_id, date)
            .map_err(|reason| RegistryError::rejected(citizen_id, shelter_id, reason))
    }

    /// Places a citizen in a shelter.
    ///
    /// An existing assignment for the citizen is updated in place; otherwise a
    /// new one is appended. Either way the citizen ends with exactly one, even
    /// if an import left several.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Rejected`] with the first failing rule; nothing is
    /// changed.
    pub fn assign(
        &mut self,
        citizen_id: &str,
        shelter_id: &str,
        check_in_date: Option<NaiveDate>,
    ) -> Result<Placement> {
        let placement = match self.propose(citizen_id, shelter_id, check_in_date) {
            Ok(placement) => placement,
            Err(e) => {
                debug!(citizen_id, shelter_id, error = %e, "Assignment rejected");
                return Err(e);
            }
        };

        self.store.apply("assign", |s| {
            let assignment = Assignment::new(
                placement.citizen_id.clone(),
                placement.shelter_id.clone(),
                placement.check_in_date,
            );
            let first = s
                .assignments
                .iter()
                .position(|a| a.citizen_id == placement.citizen_id);
            s.assignments.retain(|a| a.citizen_id != placement.citizen_id);
            match first {
                Some(index) => s.assignments.insert(index, assignment),
                None => s.assignments.push(assignment),
            }
        });
        info!(
            citizen_id = %placement.citizen_id,
            shelter_id = %placement.shelter_id,
            previous = placement.previous_shelter.as_deref().unwrap_or("-"),
            "Citizen assigned"
        );
        Ok(placement)
    }

    /// Removes the citizen's assignment, if any.
    ///
    /// Returns `false` (and emits nothing) if there was none.
    pub fn unassign(&mut self, citizen_id: &str) -> bool {
        let id = citizen_id.trim();
        if self.snapshot().assignment_for(id).is_none() {
            debug!(citizen_id = id, "Nothing to unassign");
            return false;
        }
        self.store.apply("unassign", |s| {
            s.assignments.retain(|a| a.citizen_id != id);
        });
        info!(citizen_id = id, "Citizen unassigned");
        true
    }

    /// Discards everything and restores the demonstration dataset.
    pub fn reset(&mut self) {
        let seed = demo_snapshot(self.today());
        self.store.apply("reset", |s| *s = seed);
        info!("Registry reset to demonstration data");
    }
}

fn required<'a>(raw: &'a str, field: &'static str) -> Result<&'a str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingId { field }.into());
    }
    Ok(id)
}

fn drain_assignments(snapshot: &mut Snapshot, matches: impl Fn(&Assignment) -> bool) -> usize {
    let before = snapshot.assignments.len();
    snapshot.assignments.retain(|a| !matches(a));
    before - snapshot.assignments.len()
}

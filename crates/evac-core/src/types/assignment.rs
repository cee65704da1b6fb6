//! Citizen-to-shelter placements.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{format_date, parse_date_or, require_id};
use super::kind::CollectionKind;
use super::record::Record;
use super::snapshot::Snapshot;
use crate::error::ValidationError;

/// A citizen's current shelter.
///
/// A citizen has at most one assignment; moving shelters rewrites it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// The assigned citizen.
    pub citizen_id: String,

    /// The hosting shelter.
    pub shelter_id: String,

    /// Date the citizen checked in.
    pub check_in_date: NaiveDate,
}

impl Assignment {
    /// Creates a new assignment.
    #[must_use]
    pub fn new(
        citizen_id: impl Into<String>,
        shelter_id: impl Into<String>,
        check_in_date: NaiveDate,
    ) -> Self {
        Self {
            citizen_id: citizen_id.into(),
            shelter_id: shelter_id.into(),
            check_in_date,
        }
    }
}

impl Record for Assignment {
    const KIND: CollectionKind = CollectionKind::Assignments;

    fn id(&self) -> &str {
        &self.citizen_id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.citizen_id.clone(),
            self.shelter_id.clone(),
            format_date(self.check_in_date),
        ]
    }

    fn from_fields(values: &[String], today: NaiveDate) -> Result<Self, ValidationError> {
        match values {
            [citizen_id, shelter_id, check_in_date] => Ok(Self {
                citizen_id: require_id("citizenId", citizen_id)?,
                shelter_id: require_id("shelterId", shelter_id)?,
                check_in_date: parse_date_or("checkInDate", check_in_date, today)?,
            }),
            _ => Err(ValidationError::FieldCount {
                expected: Self::KIND.fields().len(),
                found: values.len(),
            }),
        }
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.assignments
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.assignments
    }
}

//! Shelter records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{parse_count, require_id};
use super::kind::CollectionKind;
use super::record::Record;
use super::snapshot::Snapshot;
use crate::error::ValidationError;

/// A shelter that can host a fixed number of citizens.
///
/// # Examples
///
/// ```
/// use evac_core::NewShelter;
///
/// let shelter = NewShelter {
///     shelter_id: "S010".to_owned(),
///     name: "Temple".to_owned(),
///     capacity: "7".to_owned(),
///     risk_level: "Low".to_owned(),
/// }
/// .into_shelter()
/// .unwrap();
///
/// assert_eq!(shelter.capacity, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    /// Unique identifier.
    pub shelter_id: String,

    /// Display name.
    pub name: String,

    /// Maximum number of assigned citizens.
    pub capacity: u32,

    /// Risk level label; only the configured low level hosts risky-health citizens.
    pub risk_level: String,
}

/// Raw add-shelter payload, as entered by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewShelter {
    /// Identifier (required).
    pub shelter_id: String,
    /// Name.
    pub name: String,
    /// Capacity as a whole number; blank means zero.
    pub capacity: String,
    /// Risk level label.
    pub risk_level: String,
}

impl NewShelter {
    /// Returns the trimmed identifier.
    #[must_use]
    pub fn shelter_id(&self) -> &str {
        self.shelter_id.trim()
    }

    /// Validates the payload into a [`Shelter`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank id or a non-numeric capacity.
    pub fn into_shelter(self) -> Result<Shelter, ValidationError> {
        Ok(Shelter {
            shelter_id: require_id("shelterId", &self.shelter_id)?,
            name: self.name.trim().to_owned(),
            capacity: parse_count("capacity", &self.capacity)?,
            risk_level: self.risk_level.trim().to_owned(),
        })
    }
}

impl Record for Shelter {
    const KIND: CollectionKind = CollectionKind::Shelters;

    fn id(&self) -> &str {
        &self.shelter_id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.shelter_id.clone(),
            self.name.clone(),
            self.capacity.to_string(),
            self.risk_level.clone(),
        ]
    }

    fn from_fields(values: &[String], _today: NaiveDate) -> Result<Self, ValidationError> {
        match values {
            [shelter_id, name, capacity, risk_level] => NewShelter {
                shelter_id: shelter_id.clone(),
                name: name.clone(),
                capacity: capacity.clone(),
                risk_level: risk_level.clone(),
            }
            .into_shelter(),
            _ => Err(ValidationError::FieldCount {
                expected: Self::KIND.fields().len(),
                found: values.len(),
            }),
        }
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.shelters
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.shelters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_capacity_is_zero() {
        let shelter = NewShelter {
            shelter_id: "S009".to_owned(),
            ..NewShelter::default()
        }
        .into_shelter()
        .unwrap();
        assert_eq!(shelter.capacity, 0);
        assert_eq!(shelter.risk_level, "");
    }

    #[test]
    fn test_non_numeric_capacity_rejected() {
        let err = NewShelter {
            shelter_id: "S009".to_owned(),
            capacity: "lots".to_owned(),
            ..NewShelter::default()
        }
        .into_shelter()
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidNumber {
                field: "capacity",
                value: "lots".to_owned()
            }
        );
    }

    #[test]
    fn test_missing_id_rejected() {
        let err = NewShelter {
            shelter_id: "  ".to_owned(),
            capacity: "3".to_owned(),
            ..NewShelter::default()
        }
        .into_shelter()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingId { field: "shelterId" });
    }

    #[test]
    fn test_to_fields_order() {
        let shelter = Shelter {
            shelter_id: "S001".to_owned(),
            name: "Gym".to_owned(),
            capacity: 6,
            risk_level: "Low".to_owned(),
        };
        assert_eq!(shelter.to_fields(), vec!["S001", "Gym", "6", "Low"]);
    }
}

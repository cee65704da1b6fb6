//! Citizen records.
//!
//! [`NewCitizen`] is the raw add-form payload (every value a string, as typed
//! by the operator). [`Citizen`] is the validated record held in the snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{format_date, parse_date_or, parse_optional_number, require_id};
use super::kind::CollectionKind;
use super::record::Record;
use super::snapshot::Snapshot;
use crate::error::ValidationError;

/// A registered evacuee.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use evac_core::{Citizen, NewCitizen};
///
/// let today = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
/// let citizen = NewCitizen {
///     citizen_id: " C010 ".to_owned(),
///     name: "Dao".to_owned(),
///     age: "8".to_owned(),
///     ..NewCitizen::default()
/// }
/// .into_citizen(today)
/// .unwrap();
///
/// assert_eq!(citizen.citizen_id, "C010");
/// assert_eq!(citizen.age, Some(8));
/// assert_eq!(citizen.register_date, today);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
    /// Unique identifier.
    pub citizen_id: String,

    /// Free-text name.
    pub name: String,

    /// Age in years, `None` when it was left blank.
    pub age: Option<u32>,

    /// Health status; some values restrict which shelters are eligible.
    pub health_status: String,

    /// Date the citizen was registered.
    pub register_date: NaiveDate,

    /// Free-text group marker; one configured value flags the priority group.
    pub citizen_type: String,
}

/// Raw add-citizen payload, as entered by the operator.
///
/// Every field is kept as text until [`NewCitizen::into_citizen`] trims and
/// parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewCitizen {
    /// Identifier (required).
    pub citizen_id: String,
    /// Name.
    pub name: String,
    /// Age as a whole number, or blank.
    pub age: String,
    /// Health status.
    pub health_status: String,
    /// `YYYY-MM-DD`, or blank for today.
    pub register_date: String,
    /// Group marker.
    pub citizen_type: String,
}

impl NewCitizen {
    /// Returns the trimmed identifier.
    #[must_use]
    pub fn citizen_id(&self) -> &str {
        self.citizen_id.trim()
    }

    /// Validates the payload into a [`Citizen`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank id, a non-numeric age, or a
    /// malformed register date.
    pub fn into_citizen(self, today: NaiveDate) -> Result<Citizen, ValidationError> {
        Ok(Citizen {
            citizen_id: require_id("citizenId", &self.citizen_id)?,
            name: self.name.trim().to_owned(),
            age: parse_optional_number("age", &self.age)?,
            health_status: self.health_status.trim().to_owned(),
            register_date: parse_date_or("registerDate", &self.register_date, today)?,
            citizen_type: self.citizen_type.trim().to_owned(),
        })
    }
}

impl Record for Citizen {
    const KIND: CollectionKind = CollectionKind::Citizens;

    fn id(&self) -> &str {
        &self.citizen_id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.citizen_id.clone(),
            self.name.clone(),
            self.age.map(|age| age.to_string()).unwrap_or_default(),
            self.health_status.clone(),
            format_date(self.register_date),
            self.citizen_type.clone(),
        ]
    }

    fn from_fields(values: &[String], today: NaiveDate) -> Result<Self, ValidationError> {
        match values {
            [citizen_id, name, age, health_status, register_date, citizen_type] => NewCitizen {
                citizen_id: citizen_id.clone(),
                name: name.clone(),
                age: age.clone(),
                health_status: health_status.clone(),
                register_date: register_date.clone(),
                citizen_type: citizen_type.clone(),
            }
            .into_citizen(today),
            _ => Err(ValidationError::FieldCount {
                expected: Self::KIND.fields().len(),
                found: values.len(),
            }),
        }
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.citizens
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.citizens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    #[test]
    fn test_into_citizen_trims_everything() {
        let citizen = NewCitizen {
            citizen_id: "C001 ".to_owned(),
            name: "  Aom ".to_owned(),
            age: " 19".to_owned(),
            health_status: "Healthy ".to_owned(),
            register_date: " 2024-10-30 ".to_owned(),
            citizen_type: " ทั่วไป".to_owned(),
        }
        .into_citizen(today())
        .unwrap();

        assert_eq!(citizen.citizen_id, "C001");
        assert_eq!(citizen.name, "Aom");
        assert_eq!(citizen.age, Some(19));
        assert_eq!(citizen.health_status, "Healthy");
        assert_eq!(
            citizen.register_date,
            NaiveDate::from_ymd_opt(2024, 10, 30).unwrap()
        );
        assert_eq!(citizen.citizen_type, "ทั่วไป");
    }

    #[test]
    fn test_blank_age_is_unknown() {
        let citizen = NewCitizen {
            citizen_id: "C002".to_owned(),
            ..NewCitizen::default()
        }
        .into_citizen(today())
        .unwrap();
        assert_eq!(citizen.age, None);
        assert_eq!(citizen.register_date, today());
    }

    #[test]
    fn test_non_numeric_age_rejected() {
        let err = NewCitizen {
            citizen_id: "C003".to_owned(),
            age: "thirty".to_owned(),
            ..NewCitizen::default()
        }
        .into_citizen(today())
        .unwrap_err();
        assert_eq!(err.field(), Some("age"));
    }

    #[test]
    fn test_blank_id_rejected() {
        let err = NewCitizen::default().into_citizen(today()).unwrap_err();
        assert_eq!(err, ValidationError::MissingId { field: "citizenId" });
    }

    #[test]
    fn test_fields_round_trip() {
        let citizen = NewCitizen {
            citizen_id: "C004".to_owned(),
            name: "Chet".to_owned(),
            health_status: "Injured".to_owned(),
            citizen_type: "VIP".to_owned(),
            ..NewCitizen::default()
        }
        .into_citizen(today())
        .unwrap();

        let fields = citizen.to_fields();
        assert_eq!(fields[2], "");
        assert_eq!(fields[4], "2024-11-02");
        assert_eq!(Citizen::from_fields(&fields, today()).unwrap(), citizen);
    }

    #[test]
    fn test_from_fields_wrong_count() {
        let err = Citizen::from_fields(&["C001".to_owned()], today()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldCount {
                expected: 6,
                found: 1
            }
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let citizen = NewCitizen {
            citizen_id: "C005".to_owned(),
            age: "70".to_owned(),
            ..NewCitizen::default()
        }
        .into_citizen(today())
        .unwrap();
        let json = serde_json::to_string(&citizen).unwrap();
        assert!(json.contains(r#""citizenId":"C005""#));
        assert!(json.contains(r#""registerDate":"2024-11-02""#));
        assert!(json.contains(r#""age":70"#));
    }
}

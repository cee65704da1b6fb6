//! The three registry collections.
//!
//! Each collection has a fixed, ordered field list. The list is the CSV
//! header on export and the minimum header set on import.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::UnknownKind;

const CITIZEN_FIELDS: &[&str] = &[
    "citizenId",
    "name",
    "age",
    "healthStatus",
    "registerDate",
    "citizenType",
];
const SHELTER_FIELDS: &[&str] = &["shelterId", "name", "capacity", "riskLevel"];
const ASSIGNMENT_FIELDS: &[&str] = &["citizenId", "shelterId", "checkInDate"];

/// One of the three collections held by the registry.
///
/// # Examples
///
/// ```
/// use evac_core::CollectionKind;
///
/// let kind: CollectionKind = "shelters".parse().unwrap();
/// assert_eq!(kind, CollectionKind::Shelters);
/// assert_eq!(kind.fields(), &["shelterId", "name", "capacity", "riskLevel"]);
/// assert_eq!(kind.file_name(), "shelters.csv");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Registered citizens.
    Citizens,
    /// Shelters and their capacities.
    Shelters,
    /// Citizen-to-shelter placements.
    Assignments,
}

impl CollectionKind {
    /// All collections, in persistence order.
    pub const ALL: [Self; 3] = [Self::Citizens, Self::Shelters, Self::Assignments];

    /// Returns the fixed, ordered field list for this collection.
    #[inline]
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Citizens => CITIZEN_FIELDS,
            Self::Shelters => SHELTER_FIELDS,
            Self::Assignments => ASSIGNMENT_FIELDS,
        }
    }

    /// Returns the collection name (`citizens`, `shelters`, `assignments`).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Citizens => "citizens",
            Self::Shelters => "shelters",
            Self::Assignments => "assignments",
        }
    }

    /// Returns the default mirror file name, e.g. `citizens.csv`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Returns the required fields absent from `headers`, in field-list order.
    ///
    /// Header order does not matter and surrounding whitespace is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use evac_core::CollectionKind;
    ///
    /// let headers = ["name", "shelterId", "capacity", "notes"];
    /// let missing = CollectionKind::Shelters.missing_fields(headers);
    /// assert_eq!(missing.as_slice(), &["riskLevel"]);
    /// ```
    #[must_use]
    pub fn missing_fields<I, S>(self, headers: I) -> SmallVec<[&'static str; 6]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let present: SmallVec<[S; 8]> = headers.into_iter().collect();
        self.fields()
            .iter()
            .copied()
            .filter(|field| !present.iter().any(|h| h.as_ref().trim() == *field))
            .collect()
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "citizens" => Ok(Self::Citizens),
            "shelters" => Ok(Self::Shelters),
            "assignments" => Ok(Self::Assignments),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lists() {
        assert_eq!(CollectionKind::Citizens.fields().len(), 6);
        assert_eq!(CollectionKind::Shelters.fields().len(), 4);
        assert_eq!(
            CollectionKind::Assignments.fields(),
            &["citizenId", "shelterId", "checkInDate"]
        );
    }

    #[test]
    fn test_parse_round_trip() {
        for kind in CollectionKind::ALL {
            assert_eq!(kind.as_str().parse::<CollectionKind>().unwrap(), kind);
        }
        assert!("tents".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn test_missing_fields_order_independent() {
        let headers = ["checkInDate", " shelterId ", "citizenId"];
        assert!(CollectionKind::Assignments.missing_fields(headers).is_empty());
    }

    #[test]
    fn test_missing_fields_reports_all() {
        let missing = CollectionKind::Citizens.missing_fields(["citizenId", "name"]);
        assert_eq!(
            missing.as_slice(),
            &["age", "healthStatus", "registerDate", "citizenType"]
        );
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&CollectionKind::Assignments).unwrap(),
            r#""assignments""#
        );
    }
}

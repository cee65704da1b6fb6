//! Error types for the evac-engine crate.
//!
//! This module provides the [`RegistryError`] type for every outcome a
//! registry operation can refuse with.
//!
//! # Error Recovery Strategy
//!
//! None of these are faults. Each is an expected, caller-visible refusal that
//! leaves the registry unchanged:
//!
//! - **Validation** ([`RegistryError::Validation`], [`RegistryError::DuplicateId`]):
//!   show the message, let the operator correct the form
//! - **Lookups** ([`RegistryError::NotFound`]): show the message
//! - **Rule rejections** ([`RegistryError::Rejected`]): show the reason; the
//!   operator picks another shelter
//! - **Bulk transfer** ([`RegistryError::SchemaMismatch`], [`RegistryError::InvalidRow`]):
//!   fix the file and import again; nothing was replaced

use std::fmt;

use evac_core::{CollectionKind, ValidationError};
use smallvec::SmallVec;

use crate::rules::Rejection;

/// A comma-separated list of field names, for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList(pub SmallVec<[&'static str; 6]>);

impl FieldList {
    /// Returns the fields as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[&'static str] {
        &self.0
    }
}

impl fmt::Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl From<&[&'static str]> for FieldList {
    fn from(fields: &[&'static str]) -> Self {
        Self(fields.iter().copied().collect())
    }
}

/// Refusals returned by registry operations.
///
/// # Examples
///
/// ```
/// use evac_engine::{Rejection, RegistryError};
///
/// let err = RegistryError::rejected("C001", "S002", Rejection::ShelterFull);
/// assert_eq!(err.rejection(), Some(Rejection::ShelterFull));
/// assert!(err.to_string().contains("S002"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A submitted value failed entry-time validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A record with this id already exists.
    #[error("{kind}: id '{id}' already exists")]
    DuplicateId {
        /// Collection the add targeted.
        kind: CollectionKind,
        /// The duplicated id.
        id: String,
    },

    /// No record with this id exists.
    #[error("{kind}: id '{id}' not found")]
    NotFound {
        /// Collection searched.
        kind: CollectionKind,
        /// The id that was not found.
        id: String,
    },

    /// The assignment rules refused a placement.
    #[error("cannot assign '{citizen_id}' to '{shelter_id}': {reason}")]
    Rejected {
        /// Citizen proposed for placement.
        citizen_id: String,
        /// Target shelter.
        shelter_id: String,
        /// The first rule that failed.
        reason: Rejection,
    },

    /// An import's headers lack required fields.
    #[error("{kind}: header mismatch, missing {missing} (required: {required})")]
    SchemaMismatch {
        /// Collection being imported.
        kind: CollectionKind,
        /// Required fields absent from the headers.
        missing: FieldList,
        /// The complete required field list.
        required: FieldList,
    },

    /// An imported row held a value that does not parse.
    #[error("{kind}: row {row}: {source}")]
    InvalidRow {
        /// Collection being imported.
        kind: CollectionKind,
        /// 1-based data row number (the header is row 0).
        row: usize,
        /// What was wrong with the row.
        #[source]
        source: ValidationError,
    },
}

impl RegistryError {
    /// Creates a [`RegistryError::Rejected`] error.
    #[inline]
    pub fn rejected(
        citizen_id: impl Into<String>,
        shelter_id: impl Into<String>,
        reason: Rejection,
    ) -> Self {
        Self::Rejected {
            citizen_id: citizen_id.into(),
            shelter_id: shelter_id.into(),
            reason,
        }
    }

    /// Creates a [`RegistryError::NotFound`] error.
    #[inline]
    pub fn not_found(kind: CollectionKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a [`RegistryError::DuplicateId`] error.
    #[inline]
    pub fn duplicate(kind: CollectionKind, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            kind,
            id: id.into(),
        }
    }

    /// Returns the rule rejection, if this is one.
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Returns `true` for entry-time validation failures, including duplicates.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::DuplicateId { .. })
    }
}

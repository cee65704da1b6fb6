//! The [`Record`] trait shared by citizens, shelters, and assignments.

use chrono::NaiveDate;

use super::kind::CollectionKind;
use super::snapshot::Snapshot;
use crate::error::ValidationError;

/// A row type stored in one of the snapshot's collections.
///
/// Lets import, export, and lookup work over any collection without
/// matching on [`CollectionKind`] at every call site.
pub trait Record: Clone + Sized {
    /// The collection this record lives in.
    const KIND: CollectionKind;

    /// Returns the key identifying this record within its collection.
    fn id(&self) -> &str;

    /// Returns the record's values in [`CollectionKind::fields`] order.
    fn to_fields(&self) -> Vec<String>;

    /// Builds a record from values in [`CollectionKind::fields`] order.
    ///
    /// Values are trimmed; blank dates default to `today`.
    fn from_fields(values: &[String], today: NaiveDate) -> Result<Self, ValidationError>;

    /// Returns this record type's collection within `snapshot`.
    fn collection(snapshot: &Snapshot) -> &[Self];

    /// Returns this record type's collection within `snapshot`, mutably.
    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

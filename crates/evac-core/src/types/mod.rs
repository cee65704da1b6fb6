//! Domain types for the evacuation registry.
//!
//! # Module Organization
//!
//! - [`kind`] - The three collections and their fixed field lists
//! - [`citizen`] - Registered evacuees and the raw add-form payload
//! - [`shelter`] - Shelters and the raw add-form payload
//! - [`assignment`] - Citizen-to-shelter placements
//! - [`record`] - The [`Record`] trait shared by all three record types
//! - [`snapshot`] - The full registry state and its change event
//! - [`table`] - Header-plus-rows tables exchanged with the CSV codec
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use evac_core::{Citizen, CollectionKind, Snapshot};
//! ```

pub mod assignment;
pub mod citizen;
mod fields;
pub mod kind;
pub mod record;
pub mod shelter;
pub mod snapshot;
pub mod table;

pub use assignment::Assignment;
pub use citizen::{Citizen, NewCitizen};
pub use fields::format_date;
pub use kind::CollectionKind;
pub use record::Record;
pub use shelter::{NewShelter, Shelter};
pub use snapshot::{Snapshot, SnapshotChanged};
pub use table::Table;

//! Record store, assignment rules, and registry operations.
//!
//! This crate holds the registry's behavior. It performs no I/O:
//!
//! - [`RecordStore`] owns the snapshot and announces each commit as a
//!   [`SnapshotChanged`](evac_core::SnapshotChanged) event
//! - [`propose_assignment`] decides placements under an [`AssignmentPolicy`]
//! - [`Registry`] validates adds, cascades deletes, applies placements, and
//!   imports or exports whole collections
//! - [`PersistenceGateway`] and [`MirrorStore`] are the contracts storage
//!   backends implement
//!
//! # Example
//!
//! ```
//! use evac_core::{demo_snapshot, today};
//! use evac_engine::{Rejection, Registry, RecordStore};
//!
//! let mut registry = Registry::new(RecordStore::new(demo_snapshot(today())), Default::default());
//! let mut changes = registry.store_mut().subscribe();
//!
//! let err = registry.assign("C002", "S005", None).unwrap_err();
//! assert_eq!(err.rejection(), Some(Rejection::RiskyHealthRequiresLowRisk));
//!
//! registry.assign("C002", "S003", None).unwrap();
//! assert_eq!(changes.try_recv().unwrap().revision, 1);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod gateway;
pub mod registry;
pub mod rules;
pub mod stats;
pub mod store;
mod transfer;

pub use error::{FieldList, RegistryError};
pub use gateway::{MirrorStore, PersistenceGateway};
pub use registry::{Registry, Result};
pub use rules::{AssignmentPolicy, Placement, Rejection, propose_assignment};
pub use stats::{RegistryStats, ShelterOccupancy};
pub use store::{LoadOutcome, RecordRef, RecordStore};

//! File-backed persistence for the evacuation registry.
//!
//! This crate implements the storage contracts defined in `evac-engine`:
//!
//! - [`JsonFileGateway`]: the full snapshot as one pretty-printed JSON file,
//!   written atomically
//! - [`FileMirror`]: optional per-collection CSV copies
//! - [`csv`]: the CSV codec used by mirrors and by bulk import/export
//! - [`PersistenceWorker`]: the tokio task that consumes
//!   [`SnapshotChanged`](evac_core::SnapshotChanged) events and writes them
//!
//! # Usage
//!
//! ```no_run
//! use evac_core::{MirrorConfig, today};
//! use evac_engine::{RecordStore, Registry};
//! use evac_persist::{FileMirror, JsonFileGateway, PersistenceWorker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = JsonFileGateway::new("evac-data.json");
//!     let (mut store, outcome) = RecordStore::load(&gateway, today());
//!     let events = store.subscribe();
//!     if outcome.needs_save() {
//!         store.request_save();
//!     }
//!
//!     let worker = PersistenceWorker::spawn(events, gateway, FileMirror::new(MirrorConfig::default()));
//!     let mut registry = Registry::new(store, Default::default());
//!     let _ = registry.unassign("C002");
//!
//!     let report = worker.shutdown().await;
//!     println!("saved {} snapshots", report.saved);
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod csv;
pub mod error;
pub mod json;
pub mod mirror;
pub mod worker;

pub use error::PersistError;
pub use json::JsonFileGateway;
pub use mirror::FileMirror;
pub use worker::{PersistenceWorker, WorkerReport};

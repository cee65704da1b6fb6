//! Core types, validation, and configuration for the evacuation registry.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Domain records ([`Citizen`], [`Shelter`], [`Assignment`]) and the
//!   [`Snapshot`] that holds all three collections
//! - Entry-time field validation ([`ValidationError`])
//! - Configuration structures ([`Config`], [`RulesConfig`], [`StorageConfig`])
//! - The demonstration dataset used to seed an empty registry
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)
//!
//! # Crate Dependencies
//!
//! ```text
//! evac-cli ──► evac-engine ──► evac-core
//!          └─► evac-persist ──►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod seed;
pub mod types;

pub use config::{Config, MirrorConfig, RulesConfig, StorageConfig};
pub use error::{ConfigError, UnknownKind, ValidationError};
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
pub use seed::{demo_snapshot, today};
pub use types::{
    Assignment, Citizen, CollectionKind, NewCitizen, NewShelter, Record, Shelter, Snapshot,
    SnapshotChanged, Table,
};

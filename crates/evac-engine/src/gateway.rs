//! Contracts for durable storage.
//!
//! The engine never performs I/O itself. It only needs to load a snapshot once
//! at startup and to hand complete snapshots to whoever persists them. These
//! traits are that boundary; `evac-persist` implements them for files.

use evac_core::{CollectionKind, Snapshot};

/// Loads and saves complete snapshots.
pub trait PersistenceGateway: Send + Sync {
    /// The error returned by a failed load or save.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the stored snapshot.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet. Returns an error if
    /// something is stored but cannot be read back as a snapshot.
    fn load(&self) -> Result<Option<Snapshot>, Self::Error>;

    /// Replaces the stored snapshot with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// Writes per-collection text mirrors (CSV files, typically).
pub trait MirrorStore: Send + Sync {
    /// The error returned by a failed write.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns `true` if a mirror target is configured for `kind`.
    fn has_target(&self, kind: CollectionKind) -> bool;

    /// Replaces the mirror for `kind` with `text`.
    fn write(&self, kind: CollectionKind, text: &str) -> Result<(), Self::Error>;
}

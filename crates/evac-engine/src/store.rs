//! The record store: sole owner of the registry snapshot.
//!
//! This module provides [`RecordStore`], which holds the three collections
//! and announces every committed change as a [`SnapshotChanged`] event.
//!
//! # Change Events
//!
//! Persistence is not chained onto each operation. Instead the store pushes
//! the full snapshot onto an unbounded channel after each commit and moves
//! on; whoever holds the receiver decides when and how to write it.
//!
//! ```text
//! Registry operation
//!        │
//!        ▼
//!   RecordStore::apply ── revision += 1
//!        │
//!        ▼ (non-blocking send)
//!   SnapshotChanged { revision, Arc<Snapshot> }
//!        │
//!        ▼
//!   persistence worker (evac-persist)
//! ```
//!
//! # Examples
//!
//! ```
//! use evac_core::{Snapshot, demo_snapshot, today};
//! use evac_engine::RecordStore;
//!
//! let mut store = RecordStore::new(demo_snapshot(today()));
//! let mut events = store.subscribe();
//!
//! store.request_save();
//! let event = events.try_recv().unwrap();
//! assert_eq!(event.snapshot.shelters.len(), 5);
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use evac_core::{Assignment, Citizen, CollectionKind, Record, Shelter, Snapshot, SnapshotChanged};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::gateway::PersistenceGateway;

/// How [`RecordStore::load`] obtained its initial snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// A stored snapshot was read back.
    Restored,
    /// Nothing was stored; the demonstration dataset was used.
    Seeded,
    /// The stored snapshot was unreadable and was discarded for the
    /// demonstration dataset.
    Recovered,
}

impl LoadOutcome {
    /// Returns `true` if the store does not match what is on disk and should
    /// be saved straight away.
    #[must_use]
    pub const fn needs_save(self) -> bool {
        matches!(self, Self::Seeded | Self::Recovered)
    }
}

/// A borrowed record of any kind, returned by [`RecordStore::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef<'a> {
    /// A citizen.
    Citizen(&'a Citizen),
    /// A shelter.
    Shelter(&'a Shelter),
    /// An assignment (looked up by citizen id).
    Assignment(&'a Assignment),
}

impl RecordRef<'_> {
    /// Returns the record's values in field-list order.
    #[must_use]
    pub fn to_fields(&self) -> Vec<String> {
        match self {
            Self::Citizen(c) => c.to_fields(),
            Self::Shelter(s) => s.to_fields(),
            Self::Assignment(a) => a.to_fields(),
        }
    }
}

/// Owner of the in-memory snapshot.
///
/// Reads are free; writes go through [`apply`](Self::apply), which bumps the
/// revision and emits a [`SnapshotChanged`] to the current subscriber.
#[derive(Debug, Default)]
pub struct RecordStore {
    snapshot: Snapshot,
    revision: u64,
    events: Option<mpsc::UnboundedSender<SnapshotChanged>>,
}

impl RecordStore {
    /// Creates a store holding `snapshot`, with no subscriber.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            revision: 0,
            events: None,
        }
    }

    /// Loads the initial snapshot from `gateway`.
    ///
    /// Falls back to the demonstration dataset when nothing is stored or the
    /// stored snapshot cannot be read. A malformed snapshot is discarded
    /// whole, never repaired field by field.
    pub fn load<G: PersistenceGateway>(gateway: &G, today: NaiveDate) -> (Self, LoadOutcome) {
        let (mut snapshot, outcome) = match gateway.load() {
            Ok(Some(snapshot)) => {
                info!(
                    citizens = snapshot.citizens.len(),
                    shelters = snapshot.shelters.len(),
                    assignments = snapshot.assignments.len(),
                    "Restored stored snapshot"
                );
                return (Self::new(snapshot), LoadOutcome::Restored);
            }
            Ok(None) => {
                info!("No stored snapshot, seeding demonstration data");
                (Snapshot::default(), LoadOutcome::Seeded)
            }
            Err(e) => {
                warn!(error = %e, "Stored snapshot unreadable, seeding demonstration data");
                (Snapshot::default(), LoadOutcome::Recovered)
            }
        };
        snapshot.seed_if_empty(today);
        (Self::new(snapshot), outcome)
    }

    /// Opens a fresh change channel and returns its receiving end.
    ///
    /// Replaces any previous subscriber, whose receiver then sees the
    /// channel close.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SnapshotChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Returns `true` if a subscriber is attached.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.events.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Returns the current snapshot.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Returns the number of committed mutations since the store was created.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Finds the record with `id` in `kind`'s collection.
    ///
    /// Assignments are looked up by citizen id.
    #[must_use]
    pub fn lookup(&self, kind: CollectionKind, id: &str) -> Option<RecordRef<'_>> {
        match kind {
            CollectionKind::Citizens => self.snapshot.citizen(id).map(RecordRef::Citizen),
            CollectionKind::Shelters => self.snapshot.shelter(id).map(RecordRef::Shelter),
            CollectionKind::Assignments => {
                self.snapshot.assignment_for(id).map(RecordRef::Assignment)
            }
        }
    }

    /// Returns the full collection for record type `R`, in insertion order.
    #[must_use]
    pub fn list<R: Record>(&self) -> &[R] {
        R::collection(&self.snapshot)
    }

    /// Applies a mutation and commits it.
    ///
    /// The revision is bumped and a [`SnapshotChanged`] is emitted even if
    /// `mutate` left the data unchanged; callers skip the call for no-ops.
    pub fn apply<T>(&mut self, action: &'static str, mutate: impl FnOnce(&mut Snapshot) -> T) -> T {
        let output = mutate(&mut self.snapshot);
        self.revision += 1;
        debug!(revision = self.revision, action, "Snapshot committed");
        self.emit();
        output
    }

    /// Emits the current snapshot without mutating it.
    ///
    /// Used after seeding, when the in-memory state is ahead of storage.
    pub fn request_save(&mut self) {
        self.emit();
    }

    fn emit(&mut self) {
        let Some(tx) = &self.events else {
            return;
        };
        let event = SnapshotChanged {
            revision: self.revision,
            snapshot: Arc::new(self.snapshot.clone()),
        };
        if tx.send(event).is_err() {
            warn!(
                revision = self.revision,
                "Snapshot subscriber dropped, changes will not be persisted"
            );
            self.events = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use evac_core::demo_snapshot;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
    }

    enum Stored {
        Nothing,
        Snapshot(Snapshot),
        Corrupt,
    }

    struct FakeGateway(Stored);

    impl PersistenceGateway for FakeGateway {
        type Error = io::Error;

        fn load(&self) -> Result<Option<Snapshot>, Self::Error> {
            match &self.0 {
                Stored::Nothing => Ok(None),
                Stored::Snapshot(s) => Ok(Some(s.clone())),
                Stored::Corrupt => Err(io::Error::new(io::ErrorKind::InvalidData, "bad json")),
            }
        }

        fn save(&self, _snapshot: &Snapshot) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_load_restores_stored_snapshot() {
        let stored = Snapshot {
            shelters: demo_snapshot(day()).shelters,
            ..Snapshot::default()
        };
        let (store, outcome) = RecordStore::load(&FakeGateway(Stored::Snapshot(stored.clone())), day());
        assert_eq!(outcome, LoadOutcome::Restored);
        assert!(!outcome.needs_save());
        assert_eq!(store.snapshot(), &stored);
    }

    #[test]
    fn test_load_keeps_stored_empty_snapshot() {
        let (store, outcome) =
            RecordStore::load(&FakeGateway(Stored::Snapshot(Snapshot::default())), day());
        assert_eq!(outcome, LoadOutcome::Restored);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_load_seeds_when_nothing_stored() {
        let (store, outcome) = RecordStore::load(&FakeGateway(Stored::Nothing), day());
        assert_eq!(outcome, LoadOutcome::Seeded);
        assert!(outcome.needs_save());
        assert_eq!(store.snapshot(), &demo_snapshot(day()));
    }

    #[test]
    fn test_load_recovers_from_corrupt_snapshot() {
        let (store, outcome) = RecordStore::load(&FakeGateway(Stored::Corrupt), day());
        assert_eq!(outcome, LoadOutcome::Recovered);
        assert_eq!(store.snapshot().citizens.len(), 3);
    }

    #[test]
    fn test_apply_bumps_revision_and_emits() {
        let mut store = RecordStore::new(Snapshot::default());
        let mut rx = store.subscribe();
        assert!(store.has_subscriber());

        store.apply("test", |s| {
            s.assignments.push(Assignment::new("C001", "S001", day()));
        });

        assert_eq!(store.revision(), 1);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.revision, 1);
        assert_eq!(event.snapshot.assignments.len(), 1);
    }

    #[test]
    fn test_apply_without_subscriber() {
        let mut store = RecordStore::new(Snapshot::default());
        let len = store.apply("test", |s| {
            s.assignments.push(Assignment::new("C001", "S001", day()));
            s.assignments.len()
        });
        assert_eq!(len, 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_dropped_subscriber_detaches() {
        let mut store = RecordStore::new(Snapshot::default());
        drop(store.subscribe());
        store.apply("test", |_| ());
        assert!(!store.has_subscriber());
        // Later commits still succeed in memory.
        store.apply("test", |_| ());
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_lookup_by_kind() {
        let store = RecordStore::new(demo_snapshot(day()));
        assert!(matches!(
            store.lookup(CollectionKind::Citizens, "C002"),
            Some(RecordRef::Citizen(c)) if c.name == "Boss"
        ));
        assert!(matches!(
            store.lookup(CollectionKind::Assignments, "C002"),
            Some(RecordRef::Assignment(a)) if a.shelter_id == "S001"
        ));
        assert!(store.lookup(CollectionKind::Shelters, "S999").is_none());
        assert!(store.lookup(CollectionKind::Shelters, "S005").is_some());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = RecordStore::new(demo_snapshot(day()));
        let ids: Vec<_> = store.list::<Shelter>().iter().map(|s| s.shelter_id.as_str()).collect();
        assert_eq!(ids, vec!["S001", "S002", "S003", "S004", "S005"]);
    }
}

//! Background task that persists snapshot changes.
//!
//! The worker drains [`SnapshotChanged`] events from the record store and, for
//! each one, saves the snapshot through a [`PersistenceGateway`] and rewrites
//! every configured mirror. File I/O runs on tokio's blocking pool.
//!
//! ```text
//! ┌──────────────────────┐  unbounded mpsc   ┌───────────────────────────┐
//! │ RecordStore (sync)   │ ────────────────► │ PersistenceWorker (tokio) │
//! │ apply() -> emit()    │  SnapshotChanged  │ coalesce -> spawn_blocking│
//! └──────────────────────┘                   │   gateway.save()          │
//!                                            │   mirror.write() per kind │
//!                                            └───────────────────────────┘
//! ```
//!
//! Failures are logged and counted, never retried. Each event carries the
//! complete snapshot, so when several are queued only the newest is written.

use std::sync::Arc;

use evac_core::{CollectionKind, Snapshot, SnapshotChanged};
use evac_engine::{MirrorStore, PersistenceGateway};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::csv;

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    /// Events received, including coalesced ones.
    pub events: u64,
    /// Events skipped because a newer one was already queued.
    pub coalesced: u64,
    /// Successful snapshot saves.
    pub saved: u64,
    /// Failed snapshot saves.
    pub failed: u64,
    /// Mirror files written.
    pub mirrored: u64,
    /// Mirror writes that failed.
    pub mirror_failed: u64,
    /// Revision of the last snapshot written.
    pub last_revision: Option<u64>,
}

/// Handle to the running persistence task.
///
/// Dropping the handle signals the task to drain and stop without waiting;
/// call [`shutdown`](Self::shutdown) to wait for the queue to be flushed.
pub struct PersistenceWorker {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<WorkerReport>>,
}

impl std::fmt::Debug for PersistenceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceWorker")
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl PersistenceWorker {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<G, M>(events: mpsc::UnboundedReceiver<SnapshotChanged>, gateway: G, mirror: M) -> Self
    where
        G: PersistenceGateway + 'static,
        M: MirrorStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task_handle = tokio::spawn(run_worker_loop(
            events,
            shutdown_rx,
            Arc::new(gateway),
            Arc::new(mirror),
        ));
        Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
        }
    }

    /// Returns `true` if the task has not finished.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops accepting events, writes whatever is queued, and waits for the
    /// task to finish.
    ///
    /// Returns the task's counters, or the default report if the task
    /// panicked.
    pub async fn shutdown(mut self) -> WorkerReport {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already have stopped on its own.
            let _ = tx.send(());
        }

        let Some(handle) = self.task_handle.take() else {
            return WorkerReport::default();
        };
        match handle.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Persistence worker task failed");
                WorkerReport::default()
            }
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn run_worker_loop<G, M>(
    mut events: mpsc::UnboundedReceiver<SnapshotChanged>,
    mut shutdown_rx: oneshot::Receiver<()>,
    gateway: Arc<G>,
    mirror: Arc<M>,
) -> WorkerReport
where
    G: PersistenceGateway + 'static,
    M: MirrorStore + 'static,
{
    let mut report = WorkerReport::default();
    let mut draining = false;
    info!("Persistence worker started");

    loop {
        let event = if draining {
            events.recv().await
        } else {
            tokio::select! {
                biased;
                event = events.recv() => event,
                _ = &mut shutdown_rx => {
                    draining = true;
                    events.close();
                    events.recv().await
                }
            }
        };
        let Some(mut event) = event else {
            break;
        };

        report.events += 1;
        while let Ok(newer) = events.try_recv() {
            report.events += 1;
            report.coalesced += 1;
            event = newer;
        }

        persist_event(event, &gateway, &mirror, &mut report).await;
    }

    info!(
        saved = report.saved,
        failed = report.failed,
        mirrored = report.mirrored,
        "Persistence worker stopped"
    );
    report
}

async fn persist_event<G, M>(
    event: SnapshotChanged,
    gateway: &Arc<G>,
    mirror: &Arc<M>,
    report: &mut WorkerReport,
) where
    G: PersistenceGateway + 'static,
    M: MirrorStore + 'static,
{
    let revision = event.revision;
    let gateway = Arc::clone(gateway);
    let mirror = Arc::clone(mirror);

    let result = tokio::task::spawn_blocking(move || {
        write_snapshot(&*gateway, &*mirror, revision, &event.snapshot)
    })
    .await;

    match result {
        Ok(outcome) => {
            if outcome.saved {
                report.saved += 1;
                report.last_revision = Some(revision);
            } else {
                report.failed += 1;
            }
            report.mirrored += outcome.mirrored;
            report.mirror_failed += outcome.mirror_failed;
        }
        Err(e) => {
            warn!(revision, error = %e, "Persistence task aborted");
            report.failed += 1;
        }
    }
}

#[derive(Debug, Default)]
struct WriteOutcome {
    saved: bool,
    mirrored: u64,
    mirror_failed: u64,
}

fn write_snapshot<G, M>(gateway: &G, mirror: &M, revision: u64, snapshot: &Snapshot) -> WriteOutcome
where
    G: PersistenceGateway,
    M: MirrorStore,
{
    let mut outcome = WriteOutcome::default();

    match gateway.save(snapshot) {
        Ok(()) => {
            outcome.saved = true;
            debug!(revision, "Snapshot persisted");
        }
        Err(e) => warn!(revision, error = %e, "Snapshot save failed"),
    }

    for kind in CollectionKind::ALL {
        if !mirror.has_target(kind) {
            continue;
        }
        let text = csv::encode(&snapshot.to_table(kind));
        match mirror.write(kind, &text) {
            Ok(()) => outcome.mirrored += 1,
            Err(e) => {
                outcome.mirror_failed += 1;
                warn!(revision, %kind, error = %e, "Mirror write failed");
            }
        }
    }

    outcome
}

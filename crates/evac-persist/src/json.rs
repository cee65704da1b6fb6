//! Snapshot storage as a single pretty-printed JSON file.

use std::fs::{self, File};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use evac_core::Snapshot;
use evac_engine::PersistenceGateway;
use tracing::debug;

use crate::error::PersistError;

/// Stores the snapshot as JSON at a fixed path.
///
/// Saves are atomic: the file is written to `<path>.tmp`, synced, and
/// renamed over the target, so a crash mid-save leaves the previous snapshot
/// intact.
///
/// # Examples
///
/// ```no_run
/// use evac_engine::{PersistenceGateway, RecordStore};
/// use evac_persist::JsonFileGateway;
///
/// let gateway = JsonFileGateway::new("evac-data.json");
/// let (store, _outcome) = RecordStore::load(&gateway, evac_core::today());
/// gateway.save(store.snapshot())?;
/// # Ok::<(), evac_persist::PersistError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileGateway {
    path: Utf8PathBuf,
}

impl JsonFileGateway {
    /// Creates a gateway for the snapshot file at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl PersistenceGateway for JsonFileGateway {
    type Error = PersistError;

    fn load(&self) -> Result<Option<Snapshot>, Self::Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistError::io(&self.path, e)),
        };
        let snapshot = serde_json::from_str(&text)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        atomic_write(&self.path, &json)?;
        debug!(path = %self.path, bytes = json.len(), "Snapshot saved");
        Ok(())
    }
}

/// Writes `data` to `path` through a synced temporary file and a rename.
///
/// Missing parent directories are created.
pub(crate) fn atomic_write(path: &Utf8Path, data: &[u8]) -> Result<(), PersistError> {
    let tmp_path = Utf8PathBuf::from(format!("{path}.tmp"));

    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let mut file = File::create(&tmp_path).map_err(|e| PersistError::io(&tmp_path, e))?;
    file.write_all(data)
        .and_then(|()| file.sync_all())
        .map_err(|e| PersistError::io(&tmp_path, e))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| PersistError::io(path, e))
}

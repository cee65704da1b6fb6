//! CSV mirror files, one per collection.

use camino::Utf8PathBuf;
use evac_core::{CollectionKind, MirrorConfig};
use evac_engine::MirrorStore;
use tracing::trace;

use crate::error::PersistError;
use crate::json::atomic_write;

/// Writes collection mirrors to the files named in a [`MirrorConfig`].
///
/// Collections without a configured path are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMirror {
    targets: MirrorConfig,
}

impl FileMirror {
    /// Creates a mirror writing to `targets`.
    #[must_use]
    pub fn new(targets: MirrorConfig) -> Self {
        Self { targets }
    }

    /// Returns the file for `kind`, if one is configured.
    #[must_use]
    pub fn target(&self, kind: CollectionKind) -> Option<Utf8PathBuf> {
        self.targets.target(kind).map(ToOwned::to_owned)
    }

    /// Returns `true` if no collection has a target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl From<MirrorConfig> for FileMirror {
    fn from(targets: MirrorConfig) -> Self {
        Self::new(targets)
    }
}

impl MirrorStore for FileMirror {
    type Error = PersistError;

    fn has_target(&self, kind: CollectionKind) -> bool {
        self.targets.target(kind).is_some()
    }

    fn write(&self, kind: CollectionKind, text: &str) -> Result<(), Self::Error> {
        let Some(path) = self.targets.target(kind) else {
            return Ok(());
        };
        atomic_write(path, text.as_bytes())?;
        trace!(%kind, %path, "Mirror written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8Path;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_only_configured_kinds_written() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8Path::from_path(dir.path()).expect("temp dir is UTF-8");
        let mirror = FileMirror::new(MirrorConfig {
            shelters: Some(root.join("out/shelters.csv")),
            ..MirrorConfig::default()
        });

        assert!(mirror.has_target(CollectionKind::Shelters));
        assert!(!mirror.has_target(CollectionKind::Citizens));

        mirror.write(CollectionKind::Shelters, "shelterId\nS1").expect("write");
        mirror.write(CollectionKind::Citizens, "ignored").expect("skip");

        assert_eq!(
            fs::read_to_string(root.join("out/shelters.csv")).expect("read"),
            "shelterId\nS1"
        );
        assert_eq!(fs::read_dir(root.join("out")).expect("dir").count(), 1);
    }

    #[test]
    fn test_in_directory_targets_every_kind() {
        let mirror = FileMirror::from(MirrorConfig::in_directory(Utf8Path::new("mirrors")));
        for kind in CollectionKind::ALL {
            assert_eq!(
                mirror.target(kind),
                Some(Utf8PathBuf::from(format!("mirrors/{}", kind.file_name())))
            );
        }
        assert!(FileMirror::default().is_empty());
    }
}

//! Error types for the evac-persist crate.
//!
//! This module provides the [`PersistError`] type for failures while reading
//! or writing snapshots and CSV files.
//!
//! # Error Recovery Strategy
//!
//! A persistence failure never undoes the registry change that triggered it:
//!
//! - **Save and mirror failures** in the worker: logged, counted in the
//!   [`WorkerReport`](crate::WorkerReport), and skipped
//! - **Malformed snapshot on load** ([`PersistError::Json`]): the store
//!   discards it and seeds the demonstration data
//! - **CSV decode failures** ([`PersistError::Csv`]): reported to the
//!   operator; the import is not attempted

use camino::Utf8PathBuf;

/// Errors raised by the storage backends and the CSV codec.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The stored snapshot is not valid JSON for a snapshot.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV text could not be decoded.
    #[error("CSV line {line}: {reason}")]
    Csv {
        /// 1-based line where the problem was detected.
        line: usize,
        /// What was wrong.
        reason: &'static str,
    },
}

impl PersistError {
    /// Creates a [`PersistError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Json(_) | Self::Csv { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_io_names_path() {
        let err = PersistError::io(
            "data/evac.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        );
        assert_eq!(err.path().map(|p| p.as_str()), Some("data/evac.json"));
        assert_eq!(err.to_string(), "I/O error on data/evac.json: access denied");
    }

    #[test]
    fn test_csv_display() {
        let err = PersistError::Csv {
            line: 4,
            reason: "unterminated quoted field",
        };
        assert_eq!(err.to_string(), "CSV line 4: unterminated quoted field");
        assert!(err.path().is_none());
    }

    #[test]
    fn test_json_from() {
        let err: PersistError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("malformed snapshot"));
    }
}

//! Error types for the evac-core crate.
//!
//! This module provides:
//!
//! - [`ValidationError`] for form and row values rejected at entry time
//! - [`ConfigError`] for configuration loading and validation failures
//! - [`UnknownKind`] for collection names that do not parse

use camino::Utf8PathBuf;

/// A field value rejected while turning raw input into a typed record.
///
/// Raw input arrives as strings (operator forms, imported CSV rows). Numbers
/// and dates are parsed once here, so the assignment rules never see text
/// that silently coerces to zero.
///
/// # Examples
///
/// ```
/// use evac_core::ValidationError;
///
/// let error = ValidationError::InvalidNumber {
///     field: "age",
///     value: "forty".to_owned(),
/// };
/// assert!(error.to_string().contains("forty"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required identifier field was blank.
    #[error("{field} is required")]
    MissingId {
        /// Name of the identifier field.
        field: &'static str,
    },

    /// A numeric field did not hold a non-negative whole number.
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected input, trimmed.
        value: String,
    },

    /// A date field was not in `YYYY-MM-DD` form.
    #[error("{field} must be a date in YYYY-MM-DD form, got '{value}'")]
    InvalidDate {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected input, trimmed.
        value: String,
    },

    /// A projected row had the wrong number of values for its collection.
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Number of fields the collection requires.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
}

impl ValidationError {
    /// Returns the name of the field this error refers to, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingId { field }
            | Self::InvalidNumber { field, .. }
            | Self::InvalidDate { field, .. } => Some(field),
            Self::FieldCount { .. } => None,
        }
    }
}

/// A collection name that is not one of `citizens`, `shelters`, `assignments`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}' (expected citizens, shelters or assignments)")]
pub struct UnknownKind(pub String);

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use evac_core::ConfigError;
///
/// let error = ConfigError::InvalidOption {
///     option: "rules.low_risk_level".to_owned(),
///     reason: "must not be empty".to_owned(),
/// };
/// assert!(error.to_string().contains("low_risk_level"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingFile(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_id_display() {
        let error = ValidationError::MissingId { field: "citizenId" };
        assert_eq!(error.to_string(), "citizenId is required");
        assert_eq!(error.field(), Some("citizenId"));
    }

    #[test]
    fn test_invalid_date_display() {
        let error = ValidationError::InvalidDate {
            field: "registerDate",
            value: "12/01/2024".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("registerDate"));
        assert!(msg.contains("12/01/2024"));
    }

    #[test]
    fn test_field_count_has_no_field() {
        let error = ValidationError::FieldCount {
            expected: 4,
            found: 3,
        };
        assert_eq!(error.field(), None);
        assert_eq!(error.to_string(), "expected 4 fields, found 3");
    }

    #[test]
    fn test_unknown_kind_display() {
        let error = UnknownKind("tents".to_owned());
        assert!(error.to_string().contains("tents"));
    }

    #[test]
    fn test_missing_file_display() {
        let error = ConfigError::MissingFile(Utf8PathBuf::from("/etc/evac.json"));
        assert!(error.to_string().contains("/etc/evac.json"));
    }
}

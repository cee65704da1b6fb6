//! Configuration structures for the evacuation registry.
//!
//! This module provides configuration types for the registry:
//!
//! - [`StorageConfig`] - Snapshot location, CSV mirrors, autosave
//! - [`MirrorConfig`] - Optional per-collection CSV mirror files
//! - [`RulesConfig`] - Assignment policy thresholds and flag values
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`], and every section is
//! `#[serde(default)]`, so a configuration file only needs the keys it changes.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::CollectionKind;

/// Optional CSV files that mirror each collection after every change.
///
/// A `None` entry means that collection is not mirrored.
///
/// # Examples
///
/// ```
/// use evac_core::{CollectionKind, MirrorConfig};
/// use camino::Utf8PathBuf;
///
/// let mirrors = MirrorConfig {
///     shelters: Some(Utf8PathBuf::from("shelters.csv")),
///     ..MirrorConfig::default()
/// };
/// assert!(mirrors.target(CollectionKind::Shelters).is_some());
/// assert!(mirrors.target(CollectionKind::Citizens).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Mirror target for the citizens collection.
    pub citizens: Option<Utf8PathBuf>,
    /// Mirror target for the shelters collection.
    pub shelters: Option<Utf8PathBuf>,
    /// Mirror target for the assignments collection.
    pub assignments: Option<Utf8PathBuf>,
}

impl MirrorConfig {
    /// Returns the mirror target configured for `kind`.
    #[must_use]
    pub fn target(&self, kind: CollectionKind) -> Option<&Utf8Path> {
        match kind {
            CollectionKind::Citizens => self.citizens.as_deref(),
            CollectionKind::Shelters => self.shelters.as_deref(),
            CollectionKind::Assignments => self.assignments.as_deref(),
        }
    }

    /// Sets every collection's mirror to `<dir>/<kind>.csv`.
    #[must_use]
    pub fn in_directory(dir: &Utf8Path) -> Self {
        Self {
            citizens: Some(dir.join(CollectionKind::Citizens.file_name())),
            shelters: Some(dir.join(CollectionKind::Shelters.file_name())),
            assignments: Some(dir.join(CollectionKind::Assignments.file_name())),
        }
    }

    /// Returns `true` if no collection is mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        CollectionKind::ALL.iter().all(|kind| self.target(*kind).is_none())
    }
}

/// Where and how the registry snapshot is persisted.
///
/// # Examples
///
/// ```
/// use evac_core::StorageConfig;
///
/// let config = StorageConfig::default();
/// assert_eq!(config.snapshot_path, "evac-data.json");
/// assert!(config.autosave);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the full snapshot.
    pub snapshot_path: Utf8PathBuf,

    /// Per-collection CSV mirrors.
    pub mirrors: MirrorConfig,

    /// Whether changes are persisted at all.
    ///
    /// When disabled, mutations stay in memory for the lifetime of the process.
    pub autosave: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: Utf8PathBuf::from("evac-data.json"),
            mirrors: MirrorConfig::default(),
            autosave: true,
        }
    }
}

/// Thresholds and flag values used by the assignment rules.
///
/// # Examples
///
/// ```
/// use evac_core::RulesConfig;
///
/// let rules = RulesConfig::default();
/// assert_eq!(rules.child_age_below, 12);
/// assert_eq!(rules.elder_age_from, 60);
/// assert_eq!(rules.reserved_slots, 1);
/// assert!(rules.is_risky_health("Chronic"));
/// assert!(!rules.is_risky_health("Healthy"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// `citizenType` value marking the at-risk priority group.
    pub priority_citizen_type: String,

    /// Citizens younger than this are priority citizens.
    pub child_age_below: u32,

    /// Citizens this age or older are priority citizens.
    pub elder_age_from: u32,

    /// Free slots held back for priority citizens.
    ///
    /// A non-priority citizen is refused once free slots drop to this number.
    pub reserved_slots: u32,

    /// The only shelter risk level that may host risky-health citizens.
    pub low_risk_level: String,

    /// Health statuses that restrict a citizen to low-risk shelters.
    pub risky_health_statuses: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            priority_citizen_type: "กลุ่มเสี่ยง".to_owned(),
            child_age_below: 12,
            elder_age_from: 60,
            reserved_slots: 1,
            low_risk_level: "Low".to_owned(),
            risky_health_statuses: vec![
                "Chronic".to_owned(),
                "Injured".to_owned(),
                "Disabled".to_owned(),
            ],
        }
    }
}

impl RulesConfig {
    /// Returns `true` if `status` restricts a citizen to low-risk shelters.
    #[must_use]
    pub fn is_risky_health(&self, status: &str) -> bool {
        self.risky_health_statuses.iter().any(|s| s == status)
    }

    /// Checks the section for values the rules cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_risk_level.trim().is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "rules.low_risk_level".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.child_age_below > self.elder_age_from {
            return Err(ConfigError::InvalidOption {
                option: "rules.child_age_below".to_owned(),
                reason: format!(
                    "must not exceed rules.elder_age_from ({})",
                    self.elder_age_from
                ),
            });
        }
        Ok(())
    }
}

/// Root configuration for the evacuation registry.
///
/// # Examples
///
/// ```
/// use evac_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"rules": {"reserved_slots": 2}}"#).unwrap();
/// assert_eq!(config.rules.reserved_slots, 2);
/// assert_eq!(config.rules.elder_age_from, 60);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Persistence configuration.
    pub storage: StorageConfig,

    /// Assignment rule configuration.
    pub rules: RulesConfig,
}

impl Config {
    /// Loads and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if `path` does not exist, and
    /// parse or validation errors otherwise.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_owned()));
        }
        let contents = std::fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()
    }
}

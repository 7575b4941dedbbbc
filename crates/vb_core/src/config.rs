//! Snapshot key layout.
//!
//! The scorebook is stored under string keys in a key/value store. Which keys
//! are exported, where backups go and what the export file is called is
//! configurable; everything else in the engine uses fixed constants.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CoreError;

/// Env var naming a JSON file with a [`SnapshotConfig`].
pub const SNAPSHOT_CONFIG_PATH_ENV: &str = "VB_SNAPSHOT_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotConfig {
    /// Key holding the scorebook database (players, matches, rallies).
    #[serde(default = "default_db_key")]
    pub db_key: String,

    /// Only keys with one of these prefixes are exported.
    #[serde(default = "default_key_prefixes")]
    pub key_prefixes: Vec<String>,

    #[serde(default = "default_weights_key")]
    pub weights_key: String,

    /// Marker written after every successful import.
    #[serde(default = "default_last_imported_key")]
    pub last_imported_key: String,

    /// Backups of overwritten keys are stored under `<prefix><timestamp>`.
    #[serde(default = "default_backup_prefix")]
    pub backup_prefix: String,

    #[serde(default = "default_export_file_prefix")]
    pub export_file_prefix: String,
}

fn default_db_key() -> String {
    "valleyPwa.db.v3".to_string()
}
fn default_key_prefixes() -> Vec<String> {
    vec!["valleyPwa.".to_string(), "volleyPwa.".to_string()]
}
fn default_weights_key() -> String {
    "valleyPwa.weights.v1".to_string()
}
fn default_last_imported_key() -> String {
    "valleyPwa.lastImportedAt".to_string()
}
fn default_backup_prefix() -> String {
    "valleyPwa.importBackup.".to_string()
}
fn default_export_file_prefix() -> String {
    "volley-pwa-export".to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            db_key: default_db_key(),
            key_prefixes: default_key_prefixes(),
            weights_key: default_weights_key(),
            last_imported_key: default_last_imported_key(),
            backup_prefix: default_backup_prefix(),
            export_file_prefix: default_export_file_prefix(),
        }
    }
}

impl SnapshotConfig {
    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| CoreError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: SnapshotConfig =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let named = [
            ("dbKey", &self.db_key),
            ("weightsKey", &self.weights_key),
            ("lastImportedKey", &self.last_imported_key),
            ("backupPrefix", &self.backup_prefix),
            ("exportFilePrefix", &self.export_file_prefix),
        ];
        for (name, value) in named {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{} must not be empty", name)));
            }
        }

        if self.key_prefixes.is_empty() || self.key_prefixes.iter().any(|p| p.is_empty()) {
            return Err(CoreError::Config(
                "keyPrefixes must contain at least one non-empty prefix".to_string(),
            ));
        }
        for (name, key) in [("dbKey", &self.db_key), ("weightsKey", &self.weights_key)] {
            if !self.is_exported(key) {
                return Err(CoreError::Config(format!(
                    "{} '{}' is not covered by keyPrefixes and would never be exported",
                    name, key
                )));
            }
        }
        Ok(())
    }

    /// Whether `key` is picked up by snapshot export.
    pub fn is_exported(&self, key: &str) -> bool {
        self.key_prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SnapshotConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_exported("volleyPwa.anything"));
        assert!(!config.is_exported("other.key"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SnapshotConfig::from_json(r#"{ "exportFilePrefix": "club-backup" }"#).unwrap();
        assert_eq!(config.export_file_prefix, "club-backup");
        assert_eq!(config.db_key, "valleyPwa.db.v3");
    }

    #[test]
    fn test_uncovered_db_key_is_rejected() {
        let err = SnapshotConfig::from_json(r#"{ "dbKey": "scorebook.db" }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("dbKey")));

        let err = SnapshotConfig::from_json(r#"{ "keyPrefixes": [] }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
